use serde::{Deserialize, Serialize};

/// Un envío de usuario pendiente de persistir. El identificador de fila
/// lo asigna el almacén; no se exige unicidad del número Aadhaar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub aadhar_number: String,
    pub name: String,
    pub gender: String,
    pub dob: String,
}
