//! Errors for this library

/// Why a component could not be mounted
#[derive(Debug, snafu::Snafu)]
#[snafu(visibility(pub))]
pub enum MountError {
    #[snafu(display("No browser window available"))]
    /// Running outside a window (worker, test harness)
    MissingWindow,

    #[snafu(display("No <canvas> element with id '{id}'"))]
    /// The element is absent or is not a canvas
    MissingCanvas {
        /// Requested element id
        id: String,
    },

    #[snafu(display("Canvas '{id}' has no 2D context"))]
    /// `getContext("2d")` returned nothing
    MissingContext {
        /// Requested element id
        id: String,
    },

    #[snafu(display("Invalid settings"))]
    /// Settings JSON could not be parsed
    Settings {
        /// The parent error type
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use snafu::ResultExt;

    #[test]
    fn test_messages() {
        let err = MissingCanvasSnafu { id: "shotball" }.build();
        assert_eq!(err.to_string(), "No <canvas> element with id 'shotball'");

        let err = serde_json::from_str::<u32>("x")
            .context(SettingsSnafu)
            .unwrap_err();
        assert!(matches!(err, MountError::Settings { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
