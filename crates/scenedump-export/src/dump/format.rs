//! Value rendering shared by the serializers

use std::fmt;

/// `|`-separated components, e.g. `1.0|2.5|-3.0`.
///
/// Each value uses its `Debug` rendering: shortest round-trip, always with a
/// decimal point for floats, independent of locale.
pub(crate) struct Components<'a, T>(pub &'a [T]);

impl<T: fmt::Debug> fmt::Display for Components<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{value:?}")?;
        }
        Ok(())
    }
}
