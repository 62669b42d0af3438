use crate::model::{SpotLocation, TicketId, VehicleCategory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    NoSpotAvailable(VehicleCategory),
    InvalidTicket(TicketId),
    CategoryMismatch {
        spot: VehicleCategory,
        vehicle: VehicleCategory,
    },
    SpotOccupied(u32),
    AlreadyParked(String),
    NotParked(String),
    InvalidVehicle(&'static str),
    FloorNotFound(u32),
    SpotNotFound(SpotLocation),
    LimitExceeded(&'static str),
    IdExhausted,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NoSpotAvailable(category) => {
                write!(f, "no free {category} spot available")
            }
            EngineError::InvalidTicket(id) => write!(f, "invalid ticket: {id}"),
            EngineError::CategoryMismatch { spot, vehicle } => {
                write!(f, "{vehicle} cannot park in a {spot} spot")
            }
            EngineError::SpotOccupied(id) => write!(f, "spot {id} is already occupied"),
            EngineError::AlreadyParked(plate) => write!(f, "vehicle {plate} is already parked"),
            EngineError::NotParked(plate) => write!(f, "vehicle {plate} is not parked here"),
            EngineError::InvalidVehicle(msg) => write!(f, "invalid vehicle: {msg}"),
            EngineError::FloorNotFound(n) => write!(f, "floor not found: {n}"),
            EngineError::SpotNotFound(loc) => write!(f, "spot not found: {loc}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::IdExhausted => write!(f, "ticket id space exhausted for this millisecond"),
        }
    }
}

impl std::error::Error for EngineError {}
