//! Machine learning: preprocessing, estimators, metrics, and persistence.

pub mod forest;
pub mod metrics;
pub mod preprocessing;
pub mod registry;
pub mod trainer;

pub use forest::{ForestKind, RandomForest};
pub use preprocessing::{impute_for_training, OneHotEncoder, Preprocessor, StandardScaler};
pub use registry::ModelRegistry;
pub use trainer::{
    infer_task, train_and_eval, train_and_eval_with, train_test_split, Prediction,
    PredictionPipeline, Task, TrainOutcome,
};
