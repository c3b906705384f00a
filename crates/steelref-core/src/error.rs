/// Unified error type covering all failure modes across the steelref crates.
///
/// Every variant includes an actionable message guiding the consumer toward
/// recovery. The taxonomy mirrors the degradation policy of the system:
/// `DataShape` is recovered by serving an empty catalog, `PrecacheFailed` is
/// fatal only to the new cache generation, and `AssetUnavailable` is the
/// terminal rung of the fetch fallback ladder. Resolution lookups never
/// produce an error at all; they bottom out in a baseline recommendation.
///
/// Variants raised by the offline subsystem live here too, so that every
/// crate in the workspace shares one error surface regardless of which
/// subsystem raises it.
#[derive(Debug, thiserror::Error)]
pub enum SteelRefError {
    // === Catalog data errors ===
    /// The dynamic data payload did not parse as an array of steel records.
    #[error(
        "Catalog payload is not a steel array: {reason}. Serve an empty catalog and surface the data banner; search and grouping stay functional."
    )]
    DataShape {
        /// Why the payload was rejected.
        reason: String,
    },

    // === Configuration errors ===
    /// A configuration value is invalid.
    #[error("Invalid config: {field} = \"{value}\" — {reason}")]
    InvalidConfig {
        /// Which config field.
        field: &'static str,
        /// The invalid value.
        value: String,
        /// Why it is invalid.
        reason: String,
    },

    // === Offline cache errors ===
    /// A core asset could not be precached, failing the install as a whole.
    #[error(
        "Precache of {url} failed for version {version}: {source}. Install aborted; the previous cache generation keeps serving."
    )]
    PrecacheFailed {
        /// The asset that failed.
        url: String,
        /// The version tag whose install was aborted.
        version: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Activation was requested before install completed.
    #[error(
        "Activate rejected while the worker is {phase}: install has not completed for this version."
    )]
    ActivateBeforeInstall {
        /// The phase the worker was in.
        phase: &'static str,
    },

    /// A network fetch failed outright (no response was produced).
    #[error("Network fetch failed for {url}: {reason}")]
    Fetch {
        /// The requested URL.
        url: String,
        /// What went wrong.
        reason: String,
    },

    /// Both the network and the cache store were exhausted for a request.
    #[error(
        "No live or cached copy of {url}. Treat the resource as absent data rather than failing the render."
    )]
    AssetUnavailable {
        /// The requested URL.
        url: String,
    },

    /// The cache storage backend failed an operation.
    #[error("Cache store {operation} failed for \"{store}\": {detail}")]
    Store {
        /// Which operation failed (read, write, delete, list).
        operation: &'static str,
        /// The store name involved.
        store: String,
        /// Backend-specific detail.
        detail: String,
    },

    // === I/O errors ===
    /// Wraps `std::io::Error` for file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the steelref crates.
pub type SteelRefResult<T> = Result<T, SteelRefError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SteelRefError>();
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SteelRefError = io_err.into();
        assert!(matches!(err, SteelRefError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn data_shape_message_names_the_recovery() {
        let err = SteelRefError::DataShape {
            reason: "root is a JSON object".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("empty catalog"), "should suggest recovery");
        assert!(msg.contains("root is a JSON object"));
    }

    #[test]
    fn precache_failed_preserves_source() {
        let inner = std::io::Error::other("connection refused");
        let err = SteelRefError::PrecacheFailed {
            url: "./app.css?v=4.1.1".into(),
            version: "4.1.1".into(),
            source: Box::new(inner),
        };
        let msg = err.to_string();
        assert!(msg.contains("./app.css?v=4.1.1"));
        assert!(msg.contains("previous cache generation"));
        assert!(err.source().is_some());
    }

    #[test]
    fn activate_before_install_names_the_phase() {
        let err = SteelRefError::ActivateBeforeInstall { phase: "idle" };
        assert!(err.to_string().contains("idle"));
    }

    #[test]
    fn asset_unavailable_display() {
        let err = SteelRefError::AssetUnavailable {
            url: "./icons/icon-512.png".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("./icons/icon-512.png"));
        assert!(msg.contains("absent data"));
    }

    #[test]
    fn store_error_display() {
        let err = SteelRefError::Store {
            operation: "write",
            store: "steelref-static-4.1.1".into(),
            detail: "quota exceeded".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("write"));
        assert!(msg.contains("steelref-static-4.1.1"));
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn invalid_config_display() {
        let err = SteelRefError::InvalidConfig {
            field: "compare_capacity",
            value: "0".into(),
            reason: "must be at least 1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("compare_capacity"));
        assert!(msg.contains("must be at least 1"));
    }

    #[test]
    fn result_alias_works() {
        let ok: SteelRefResult<u32> = Ok(7);
        assert!(ok.is_ok());
        let err: SteelRefResult<u32> = Err(SteelRefError::AssetUnavailable { url: "./".into() });
        assert!(err.is_err());
    }
}
