/// Log a `CollectError` at error level and evaluate to `Err` of it.
#[macro_export]
macro_rules! log_and_err {
    ($err:expr) => {{
        let err: $crate::error::CollectError = $err;
        log::error!("{}", err);
        Err(err)
    }};
}
