//! Logging that forwards to `defmt` and/or `log`, whichever is enabled.

macro_rules! emit {
    ($level:ident, $($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::$level!($($arg)*);
        #[cfg(feature = "log")]
        log::$level!($($arg)*);
    }};
}

macro_rules! trace {
    ($($arg:tt)*) => {
        emit!(trace, $($arg)*)
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        emit!(debug, $($arg)*)
    };
}

macro_rules! warn {
    ($($arg:tt)*) => {
        emit!(warn, $($arg)*)
    };
}
