use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("catalogue defines no institute ratio columns")]
    NoInstitutes,

    #[error("duplicate catalogue item id `{id}`")]
    DuplicateItemId { id: String },

    #[error("item `{id}`: fee must be non-negative, got {fee}")]
    InvalidFee { id: String, fee: Decimal },

    #[error("item `{id}`: no cost-share ratio for institute `{institute}`")]
    MissingRatio { id: String, institute: String },

    #[error("item `{id}`: ratio for institute `{institute}` must lie in [0, 1], got {ratio}")]
    InvalidRatio {
        id: String,
        institute: String,
        ratio: Decimal,
    },

    #[error("excess-antibody item `{id}` must appear after the free-text (ク) item")]
    ExcessItemBeforeFreeText { id: String },

    #[error("institute `{institute}` is not defined in the catalogue")]
    UnknownInstitute { institute: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
