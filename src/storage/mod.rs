pub mod patients;

pub use patients::{Patient, PatientStore, StoreError};
