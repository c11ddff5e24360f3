use std::collections::VecDeque;

use anyhow::Result;
use pixplat::{
    diagnostics::exit_with_error,
    draw::Platform,
    platform_fatal,
    window::{make_window, Game},
    Key, NamedKey,
};
use rand::Rng;

const COLS: i32 = 16;
const ROWS: i32 = 9;
const STEP_SECONDS: f32 = 0.125;

const BACKGROUND: u32 = 0xFF181818;
const GRID: u32 = 0xFF303030;
const SNAKE: u32 = 0xFF32A852;
const FOOD: u32 = 0xFF3232E0;
const TEXT: u32 = 0xFFFFFFFF;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[derive(Clone, Copy)]
enum State {
    Playing,
    Paused,
    Dead,
}

struct Snake {
    width: u32,
    height: u32,
    body: VecDeque<(i32, i32)>,
    dir: Dir,
    queued: VecDeque<Dir>,
    food: (i32, i32),
    score: u32,
    since_step: f32,
    state: State,
}

impl Snake {
    fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            body: VecDeque::new(),
            dir: Dir::Right,
            queued: VecDeque::new(),
            food: (0, 0),
            score: 0,
            since_step: 0.0,
            state: State::Playing,
        }
    }

    fn restart(&mut self) {
        self.body = VecDeque::from([(3, ROWS / 2), (2, ROWS / 2), (1, ROWS / 2)]);
        self.dir = Dir::Right;
        self.queued.clear();
        self.score = 0;
        self.since_step = 0.0;
        self.state = State::Playing;
        self.place_food();
    }

    fn place_food(&mut self) {
        if self.body.len() as i32 >= COLS * ROWS {
            platform_fatal!("no room left for food");
        }
        let mut rng = rand::thread_rng();
        loop {
            let cell = (rng.gen_range(0..COLS), rng.gen_range(0..ROWS));
            if !self.body.contains(&cell) {
                self.food = cell;
                return;
            }
        }
    }

    fn turn(&mut self, dir: Dir) {
        let last = self.queued.back().copied().unwrap_or(self.dir);
        if dir != last && dir != last.opposite() {
            self.queued.push_back(dir);
        }
    }

    fn step(&mut self) {
        if let Some(dir) = self.queued.pop_front() {
            self.dir = dir;
        }
        let (dx, dy) = self.dir.delta();
        let Some(&(hx, hy)) = self.body.front() else {
            return;
        };
        let head = ((hx + dx).rem_euclid(COLS), (hy + dy).rem_euclid(ROWS));

        if head == self.food {
            self.body.push_front(head);
            self.score += 1;
            self.place_food();
            return;
        }

        self.body.pop_back();
        if self.body.contains(&head) {
            log::info!("snake died with score {}", self.score);
            self.state = State::Dead;
            return;
        }
        self.body.push_front(head);
    }

    fn cell_size(&self) -> (i32, i32) {
        (self.width as i32 / COLS, self.height as i32 / ROWS)
    }

    fn centered_text(&self, platform: &mut Platform, text: &str, y: i32, size: u32) -> Result<()> {
        let width = platform.text_width(text, size)? as i32;
        platform.fill_text((self.width as i32 - width) / 2, y, text, size, TEXT)
    }
}

impl Game for Snake {
    fn init(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.restart();
    }

    fn on_keydown(&mut self, key: &Key) {
        match key {
            Key::Named(NamedKey::ArrowUp) => self.turn(Dir::Up),
            Key::Named(NamedKey::ArrowDown) => self.turn(Dir::Down),
            Key::Named(NamedKey::ArrowLeft) => self.turn(Dir::Left),
            Key::Named(NamedKey::ArrowRight) => self.turn(Dir::Right),
            Key::Named(NamedKey::Space) => {
                self.state = match self.state {
                    State::Playing => State::Paused,
                    State::Paused => State::Playing,
                    State::Dead => {
                        self.restart();
                        State::Playing
                    }
                }
            }
            _ => {}
        }
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn update(&mut self, dt: f32) {
        if !matches!(self.state, State::Playing) {
            return;
        }
        self.since_step += dt;
        while self.since_step >= STEP_SECONDS {
            self.since_step -= STEP_SECONDS;
            self.step();
        }
    }

    fn render(&mut self, platform: &mut Platform) -> Result<()> {
        let (cw, ch) = self.cell_size();
        let (w, h) = (self.width as i32, self.height as i32);

        platform.fill_rect(0, 0, w, h, BACKGROUND)?;
        for col in 1..COLS {
            platform.stroke_line(col * cw, 0, col * cw, h, GRID)?;
        }
        for row in 1..ROWS {
            platform.stroke_line(0, row * ch, w, row * ch, GRID)?;
        }

        let (fx, fy) = self.food;
        platform.fill_rect(fx * cw, fy * ch, cw, ch, FOOD)?;
        for &(x, y) in &self.body {
            platform.fill_rect(x * cw, y * ch, cw, ch, SNAKE)?;
            platform.stroke_rect(x * cw, y * ch, cw, ch, BACKGROUND)?;
        }

        // one cache entry per score ever shown
        platform.fill_text(16, 48, &format!("Score: {}", self.score), 32, TEXT)?;

        match self.state {
            State::Playing => {}
            State::Paused => self.centered_text(platform, "Paused", h / 2, 64)?,
            State::Dead => {
                self.centered_text(platform, "Game Over", h / 2, 96)?;
                self.centered_text(platform, "press space to restart", h / 2 + 64, 32)?;
            }
        }
        Ok(())
    }
}

fn main() {
    let result = make_window()
        .with_title("Snake")
        .with_window_size((16 * 100, 9 * 100))
        .run(Snake::new());
    if let Err(err) = result {
        exit_with_error(err);
    }
}
