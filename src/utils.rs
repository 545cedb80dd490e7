//! # Utility Functions Module
//!
//! Small helpers for building external tool argument vectors.

/// Builds a `Vec<String>` of tool arguments from heterogeneous expressions.
///
/// Every item only needs to implement `Display`.
///
/// # Example
/// ```rust
/// use media_sweeper::args;
///
/// let quality = 80;
/// let args = args!["-c:v", "libwebp", "-q:v", quality];
/// assert_eq!(args, vec!["-c:v", "libwebp", "-q:v", "80"]);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        vec![$(::std::string::ToString::to_string(&$item)),*]
    };
}
