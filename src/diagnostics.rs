use std::{cell::RefCell, process, rc::Rc};

/// Where cache events and other informational lines go.
pub trait LogSink {
    fn log(&mut self, message: &str);
}

/// Forwards to the `log` facade at info level.
#[derive(Default, Clone, Copy, Debug)]
pub struct EnvLogSink;

impl LogSink for EnvLogSink {
    fn log(&mut self, message: &str) {
        log::info!("{}", message);
    }
}

/// Keeps every message. Clones share the same buffer, so one half can be
/// handed to a cache while the other is inspected.
#[derive(Default, Clone, Debug)]
pub struct RecordingSink {
    messages: Rc<RefCell<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn count(&self, message: &str) -> usize {
        self.messages
            .borrow()
            .iter()
            .filter(|m| m.as_str() == message)
            .count()
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl LogSink for RecordingSink {
    fn log(&mut self, message: &str) {
        log::info!("{}", message);
        self.messages.borrow_mut().push(message.to_string());
    }
}

pub fn assertion_message(file: &str, line: u32, message: &str) -> String {
    format!("{}:{}: GAME ASSERTION FAILED: {}", file, line, message)
}

/// How the process is about to end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    Abort,
    Code(i32),
}

/// Runs right before the process ends. Can only look, or unwind out by panicking.
pub type TerminationHook = Box<dyn Fn(Exit, &str)>;

thread_local! {
    static TERMINATION_HOOK: RefCell<Option<TerminationHook>> = RefCell::new(None);
}

/// Installs `hook` for this thread and returns the one it replaces.
pub fn set_termination_hook(hook: Option<TerminationHook>) -> Option<TerminationHook> {
    TERMINATION_HOOK.with(|slot| slot.replace(hook))
}

fn terminate(exit: Exit, message: &str) -> ! {
    log::error!("{}", message);
    eprintln!("{}", message);
    TERMINATION_HOOK.with(|slot| {
        if let Some(hook) = slot.borrow().as_ref() {
            hook(exit, message);
        }
    });
    match exit {
        Exit::Abort => process::abort(),
        Exit::Code(code) => process::exit(code),
    }
}

/// Game-side assertion failure. Prints where it happened and aborts.
pub fn fatal(file: &str, line: u32, message: &str) -> ! {
    terminate(Exit::Abort, &assertion_message(file, line, message))
}

/// Backend or resource failure. There's no way to recover from these,
/// so print the whole error chain and exit.
pub fn exit_with_error(err: anyhow::Error) -> ! {
    terminate(Exit::Code(1), &format!("PLATFORM ERROR: {:#}", err))
}

#[macro_export]
macro_rules! platform_fatal {
    ($($arg:tt)*) => {
        $crate::diagnostics::fatal(file!(), line!(), &format!($($arg)*))
    };
}
