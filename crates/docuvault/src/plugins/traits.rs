//! Base plugin trait definition.
//!
//! All pipeline plugins implement the `Plugin` trait, which provides basic
//! lifecycle management and metadata methods.

use crate::error::Result;

/// Base trait that all plugins must implement.
///
/// # Thread Safety
///
/// Plugins are stored in `Arc<dyn Trait>` and called with `&self`, so they
/// must be `Send + Sync`; use interior mutability (`Mutex`, atomics,
/// `OnceCell`) for any mutable state.
///
/// # Example
///
/// ```rust
/// use docuvault::plugins::Plugin;
/// use docuvault::Result;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct MyPlugin {
///     ready: AtomicBool,
/// }
///
/// impl Plugin for MyPlugin {
///     fn name(&self) -> &str {
///         "my-plugin"
///     }
///
///     fn version(&self) -> String {
///         "1.0.0".to_string()
///     }
///
///     fn initialize(&self) -> Result<()> {
///         self.ready.store(true, Ordering::Release);
///         Ok(())
///     }
///
///     fn shutdown(&self) -> Result<()> {
///         self.ready.store(false, Ordering::Release);
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// Unique identifier for this plugin.
    ///
    /// Names are lowercase kebab-case and are what rule bindings reference
    /// in configuration.
    fn name(&self) -> &str;

    /// Semantic version of this plugin (`MAJOR.MINOR.PATCH`).
    fn version(&self) -> String;

    /// Initialize the plugin.
    ///
    /// Called once when the plugin is registered. A plugin that fails to
    /// initialize is not registered.
    fn initialize(&self) -> Result<()>;

    /// Shutdown the plugin.
    ///
    /// Called when the plugin is unregistered or the registry shuts down.
    fn shutdown(&self) -> Result<()>;

    /// Optional plugin description for debugging and logging.
    fn description(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct TestPlugin {
        ready: AtomicBool,
    }

    impl Plugin for TestPlugin {
        fn name(&self) -> &str {
            "test-plugin"
        }

        fn version(&self) -> String {
            "1.0.0".to_string()
        }

        fn initialize(&self) -> Result<()> {
            self.ready.store(true, Ordering::Release);
            Ok(())
        }

        fn shutdown(&self) -> Result<()> {
            self.ready.store(false, Ordering::Release);
            Ok(())
        }

        fn description(&self) -> &str {
            "A test plugin"
        }
    }

    #[test]
    fn test_plugin_metadata() {
        let plugin = TestPlugin {
            ready: AtomicBool::new(false),
        };
        assert_eq!(plugin.name(), "test-plugin");
        assert_eq!(plugin.version(), "1.0.0");
        assert_eq!(plugin.description(), "A test plugin");
    }

    #[test]
    fn test_plugin_lifecycle() {
        let plugin = TestPlugin {
            ready: AtomicBool::new(false),
        };

        assert!(!plugin.ready.load(Ordering::Acquire));

        plugin.initialize().unwrap();
        assert!(plugin.ready.load(Ordering::Acquire));

        plugin.shutdown().unwrap();
        assert!(!plugin.ready.load(Ordering::Acquire));
    }
}
