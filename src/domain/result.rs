//! Result type alias for Waypoint

use super::errors::WaypointError;

/// Result type alias for Waypoint operations
///
/// # Examples
///
/// ```
/// use waypoint::domain::result::Result;
/// use waypoint::domain::errors::WaypointError;
///
/// fn failing_function() -> Result<()> {
///     Err(WaypointError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, WaypointError>;
