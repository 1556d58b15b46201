use std::fmt::Debug;

/// Extension trait for draining fallible internal operations whose failure
/// degrades to "operation did not happen".
pub trait ResultExt<T> {
    /// Logs the error, if any, and converts to `Option`.
    fn log_err(self) -> Option<T>;
}

impl<T, E: Debug> ResultExt<T> for Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                log::error!("{}:{}: {:?}", caller.file(), caller.line(), error);
                None
            }
        }
    }
}

/// Increments `value` and returns its previous value.
pub fn post_inc(value: &mut u32) -> u32 {
    let prev = *value;
    *value += 1;
    prev
}
