//! Logging settings, including the level filter and output format.

use anyhow::Context;
use serde::{de, ser::SerializeSeq, Deserialize, Serialize};
use std::str::FromStr;
use tracing_subscriber::{filter::Directive, EnvFilter};

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// The minimum level that logs should be reported at.
    ///
    /// Each entry can be one of `ERROR`, `WARN`, `INFO`, `DEBUG`, or `TRACE`
    /// (in increasing verbosity), with an optional component that specifies
    /// the source of the logs, such as `casita_web=DEBUG`.
    ///
    /// In YAML config files this is a sequence of directives. The
    /// environment variable `CASITA_LOGGING__LEVELS` can also be used, as a
    /// single comma separated string, and completely overrides the config
    /// file.
    pub levels: LogLevels,

    /// The format to output logs in.
    pub format: LogFormat,
}

/// The format to output logs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// [`tracing-subscriber`]'s human targeted, pretty format. Includes more
    /// information, multiple lines per log event.
    Pretty,

    /// [MozLog](https://wiki.mozilla.org/Firefox/Services/Logging) JSON
    /// format. One line per log event.
    MozLog,

    /// [`tracing-subscriber`]'s default format. One line per log event.
    Compact,
}

/// A validated collection of logging filter directives.
///
/// Tracing's [`Directive`] is neither `Clone` nor serializable, so the
/// directives are kept as strings. Every entry in this struct is guaranteed
/// to parse as a valid `Directive`; that is checked when the collection is
/// built, whether from a comma separated string (`"INFO,casita_web=DEBUG"`,
/// the shape environment variables arrive in) or from a sequence of such
/// strings (the shape config files use).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogLevels(Vec<String>);

impl LogLevels {
    /// Iterate over the directives as strings.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromStr for LogLevels {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<String> = s.split(',').map(|part| part.trim().to_string()).collect();

        // Reject the whole string if any entry is not a valid directive.
        for part in &parts {
            part.parse::<Directive>()
                .with_context(|| format!("invalid logging directive {:?}", part))?;
        }

        Ok(Self(parts))
    }
}

impl Serialize for LogLevels {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for directive in &self.0 {
            seq.serialize_element(directive)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for LogLevels {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        /// Accepts either one comma separated string or a sequence of them.
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = LogLevels;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "directive or list of directives")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                s.parse().map_err(|_err| {
                    de::Error::invalid_value(de::Unexpected::Str(s), &"valid directive")
                })
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut levels = LogLevels::default();

                while let Some(item) = seq.next_element::<String>()? {
                    let parsed: LogLevels = item.parse().map_err(|err: anyhow::Error| {
                        de::Error::invalid_value(
                            de::Unexpected::Str(&item),
                            &err.to_string().as_str(),
                        )
                    })?;
                    levels.0.extend(parsed.0);
                }

                Ok(levels)
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

impl From<&LogLevels> for EnvFilter {
    fn from(levels: &LogLevels) -> Self {
        let mut filter = EnvFilter::default();
        for directive in &levels.0 {
            // Already validated when the collection was built.
            filter = filter.add_directive(directive.parse().unwrap());
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_comma_separated_string() {
        let levels: LogLevels = "INFO,casita_web=DEBUG".parse().expect("should parse");
        assert_eq!(
            levels.iter().collect::<Vec<_>>(),
            vec!["INFO", "casita_web=DEBUG"]
        );
    }

    #[test]
    fn rejects_invalid_directives() {
        assert!("INFO,not a directive!".parse::<LogLevels>().is_err());
    }

    #[test]
    fn deserializes_from_a_string() {
        let levels: LogLevels =
            serde_json::from_str(r#""WARN,casita_store=TRACE""#).expect("should deserialize");
        assert_eq!(
            levels.iter().collect::<Vec<_>>(),
            vec!["WARN", "casita_store=TRACE"]
        );
    }

    #[test]
    fn deserializes_from_a_sequence() {
        let levels: LogLevels =
            serde_json::from_str(r#"["INFO", "casita_web=DEBUG,casita_store=WARN"]"#)
                .expect("should deserialize");
        assert_eq!(
            levels.iter().collect::<Vec<_>>(),
            vec!["INFO", "casita_web=DEBUG", "casita_store=WARN"]
        );
    }

    #[test]
    fn rejects_invalid_entries_in_a_sequence() {
        let result: Result<LogLevels, _> = serde_json::from_str(r#"["INFO", "==="]"#);
        assert!(result.is_err());
    }

    #[test]
    fn log_format_uses_lowercase_names() {
        let format: LogFormat = serde_json::from_str(r#""mozlog""#).expect("should deserialize");
        assert_eq!(format, LogFormat::MozLog);
        assert_eq!(
            serde_json::to_string(&LogFormat::Pretty).expect("should serialize"),
            r#""pretty""#
        );
    }
}
