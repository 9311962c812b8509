/// Errors returned by [`crate::Matcher`].
#[derive(thiserror::Error, Debug)]
pub enum MatchError {
    #[error("no modalities supplied")]
    EmptyInput,
    #[error("no templates registered")]
    NoTemplates,
    #[error(
        "modality {index} has dimensions {width}x{height}, expected {expected_width}x{expected_height}"
    )]
    DimensionMismatch {
        index: usize,
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },
}
