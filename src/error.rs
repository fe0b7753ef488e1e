/// Errors returned by the checked query variants.
///
/// The unchecked queries never fail: they degrade to empty or zero results instead.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid position range: begin ({begin}) must be less than end ({end})")]
    InvalidRange { begin: f32, end: f32 },
    #[error("item index {index} is out of range (item count {count})")]
    IndexOutOfRange { index: usize, count: usize },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
