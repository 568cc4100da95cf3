//! Bundled demonstration grammars
//!
//! Two grammars built exclusively through the public grammar surface: a
//! C-like/ECMAScript-flavored grammar and a small tag-markup grammar whose
//! fenced code blocks delegate to the former. The engine never
//! special-cases either; they exist so the crate is usable out of the box
//! and the engine is exercisable end to end.

pub mod ecmascript;
pub mod markup;

use crate::context::Group;
use crate::grammar::After;

/// Open hook for comments: jump straight to the start of the closer so the
/// body is emitted as one token. `None` (closer absent) leaves the body to
/// ordinary in-goal scanning, which folds it anyway.
pub(crate) fn comment_fast_forward(source: &str, offset: usize, group: &Group) -> Option<After> {
    source[offset..]
        .find(group.closer.as_str())
        .map(|i| After::FastForward(offset + i))
}

/// Open hook for plain quotes: jump to the closing delimiter, honoring
/// backslash escapes. Byte-wise scan; the closer is a single ASCII byte, so
/// skipping an escaped pair can never land on a false positive inside a
/// multi-byte character.
pub(crate) fn quote_fast_forward(source: &str, offset: usize, group: &Group) -> Option<After> {
    let bytes = source.as_bytes();
    let closer = group.closer.as_bytes().first().copied()?;
    let mut i = offset;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == closer => return Some(After::FastForward(i)),
            _ => i += 1,
        }
    }
    None
}
