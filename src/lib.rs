//! EDS-Mineral: mineral classification from SEM-EDS element tables
//!
//! Each row of the input table is one particle's elemental composition.
//! Rows are classified into mineral labels by one of four schemes.
//!
//! ## Architecture
//!
//! - **Column Normalizer**: canonical element symbols from free-form headers
//! - **Ratio Engine**: per-scheme element ratios, IEEE-754 division
//! - **Schemes**: Donarummo tree, Panta and Kandler checklists, Weber features
//! - **Model**: pretrained bagged-tree classifier for the ML scheme
//! - **Dispatcher**: selector validation and per-scheme output shape

pub mod config;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod model;
pub mod normalize;
pub mod ratios;
pub mod schemes;
pub mod types;

// Re-export configuration
pub use config::ClassifierConfig;

// Re-export the classification entry points
pub use dispatch::{BatchReport, Classification, Classifier, ClassifierSettings, SchemeOutput};
pub use error::{ClassifyError, SchemaError};

// Re-export shared types
pub use types::{Element, ElementTable, Scheme};

// Re-export model components
pub use model::{BaggedTreeModel, ModelError, ModelPrediction, PretrainedClassifier};

// Re-export per-scheme labels
pub use schemes::donarummo::DonarummoClass;
pub use schemes::kandler::{KandlerClass, KandlerRecord};
pub use schemes::panta::PantaClass;
pub use schemes::weber::MlRecord;
pub use schemes::MineralLabel;
