//! Listener configuration from the command line and environment.

/// Command-line token that turns on colored output.
pub const DEV_FLAG: &str = "--dev";

/// Environment variable selecting the diagnostic log level.
pub const LOG_LEVEL_ENV: &str = "SUPERLOG_LOG";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Color each record per process identity.
    pub dev: bool,
}

impl ListenerConfig {
    /// Build from program arguments (without argv[0]).
    ///
    /// `--dev` may appear anywhere. Everything else is ignored: supervisors
    /// pass the configured command line through verbatim.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            dev: args.into_iter().any(|arg| arg.as_ref() == DEV_FLAG),
        }
    }
}

/// Tracing filter directive for the given `SUPERLOG_LOG` value.
///
/// Defaults to `warn`: stderr also carries the aggregated output, so routine
/// diagnostics stay out of it unless asked for.
pub fn diagnostic_filter(level: Option<&str>) -> String {
    let level = match level {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("error") => "error",
        _ => "warn",
    };
    format!("superlog={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_flag_anywhere() {
        assert!(ListenerConfig::from_args(["--dev"]).dev);
        assert!(ListenerConfig::from_args(["a", "b", "--dev", "c"]).dev);
    }

    #[test]
    fn no_flag_means_plain_output() {
        assert_eq!(ListenerConfig::from_args(Vec::<String>::new()), ListenerConfig::default());
        assert!(!ListenerConfig::from_args(["--development", "-dev"]).dev);
    }

    #[test]
    fn filter_levels() {
        assert_eq!(diagnostic_filter(None), "superlog=warn");
        assert_eq!(diagnostic_filter(Some("debug")), "superlog=debug");
        assert_eq!(diagnostic_filter(Some("error")), "superlog=error");
        assert_eq!(diagnostic_filter(Some("verbose")), "superlog=warn");
    }
}
