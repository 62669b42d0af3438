use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use ulid::Ulid;

use crate::engine::EngineError;

/// Unix milliseconds. The only time type.
pub type Ms = i64;

/// Fee in the lot's single currency unit.
pub type Amount = u64;

pub const HOUR_MS: Ms = 3_600_000;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }
}

// ── Vehicles ─────────────────────────────────────────────────────

/// The kind of vehicle a spot is built for. Declaration order is the
/// order spots are laid out on a floor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    Bicycle,
    #[serde(alias = "bike")]
    Motorcycle,
    Car,
    #[serde(alias = "suv")]
    Truck,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 4] = [
        VehicleCategory::Bicycle,
        VehicleCategory::Motorcycle,
        VehicleCategory::Car,
        VehicleCategory::Truck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleCategory::Bicycle => "bicycle",
            VehicleCategory::Motorcycle => "motorcycle",
            VehicleCategory::Car => "car",
            VehicleCategory::Truck => "truck",
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bicycle" => Ok(VehicleCategory::Bicycle),
            "motorcycle" | "bike" => Ok(VehicleCategory::Motorcycle),
            "car" => Ok(VehicleCategory::Car),
            "truck" | "suv" => Ok(VehicleCategory::Truck),
            _ => Err(EngineError::InvalidVehicle("unknown vehicle category")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub plate: String,
    pub category: VehicleCategory,
}

impl Vehicle {
    pub fn new(plate: impl Into<String>, category: VehicleCategory) -> Self {
        Self {
            plate: plate.into(),
            category,
        }
    }
}

// ── Spots ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpotStatus {
    Free,
    Occupied,
}

/// A single slot typed to one vehicle category. Occupancy is derived from
/// the parked vehicle, so status and vehicle can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParkingSpot {
    pub id: u32,
    pub category: VehicleCategory,
    vehicle: Option<Vehicle>,
}

impl ParkingSpot {
    pub fn new(id: u32, category: VehicleCategory) -> Self {
        Self {
            id,
            category,
            vehicle: None,
        }
    }

    pub fn status(&self) -> SpotStatus {
        if self.vehicle.is_some() {
            SpotStatus::Occupied
        } else {
            SpotStatus::Free
        }
    }

    pub fn is_free(&self) -> bool {
        self.vehicle.is_none()
    }

    pub fn vehicle(&self) -> Option<&Vehicle> {
        self.vehicle.as_ref()
    }

    /// Free and built for the vehicle's category.
    pub fn can_fit(&self, vehicle: &Vehicle) -> bool {
        self.is_free() && self.category == vehicle.category
    }

    pub fn occupy(&mut self, vehicle: Vehicle) -> Result<(), EngineError> {
        if !self.is_free() {
            return Err(EngineError::SpotOccupied(self.id));
        }
        if !self.can_fit(&vehicle) {
            return Err(EngineError::CategoryMismatch {
                spot: self.category,
                vehicle: vehicle.category,
            });
        }
        self.vehicle = Some(vehicle);
        Ok(())
    }

    /// Returns the vehicle that was parked here. Vacating a free spot is a no-op.
    pub fn vacate(&mut self) -> Option<Vehicle> {
        self.vehicle.take()
    }
}

// ── Floors ───────────────────────────────────────────────────────

/// Spot composition of one floor: how many spots of each category.
/// Naming a category twice (including through an alias) is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FloorLayout {
    pub spots: BTreeMap<VehicleCategory, u32>,
}

impl FloorLayout {
    pub fn new(spots: impl IntoIterator<Item = (VehicleCategory, u32)>) -> Self {
        Self {
            spots: spots.into_iter().collect(),
        }
    }

    pub fn total(&self) -> u64 {
        self.spots.values().map(|n| *n as u64).sum()
    }
}

impl<'de> Deserialize<'de> for FloorLayout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SpotCounts;

        impl<'de> Visitor<'de> for SpotCounts {
            type Value = FloorLayout;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from vehicle category to spot count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FloorLayout, A::Error> {
                let mut spots = BTreeMap::new();
                while let Some((category, count)) = map.next_entry::<VehicleCategory, u32>()? {
                    if spots.insert(category, count).is_some() {
                        return Err(de::Error::custom(format!(
                            "{category} spots listed more than once"
                        )));
                    }
                }
                Ok(FloorLayout { spots })
            }
        }

        deserializer.deserialize_map(SpotCounts)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotLayout {
    pub floors: Vec<FloorLayout>,
}

impl LotLayout {
    /// `count` floors that all share the same composition.
    pub fn uniform(count: u32, floor: FloorLayout) -> Self {
        Self {
            floors: (0..count).map(|_| floor.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Floor {
    pub number: u32,
    spots: Vec<ParkingSpot>,
    /// Free spots per category. Must equal the number of free spots of
    /// that category after every occupy/vacate.
    free: HashMap<VehicleCategory, usize>,
}

impl Floor {
    pub fn new(number: u32, layout: &FloorLayout) -> Self {
        let mut spots = Vec::with_capacity(layout.total() as usize);
        let mut free = HashMap::new();
        let mut id = 0u32;
        for (&category, &count) in &layout.spots {
            for _ in 0..count {
                spots.push(ParkingSpot::new(id, category));
                id += 1;
            }
            *free.entry(category).or_insert(0) += count as usize;
        }
        Self {
            number,
            spots,
            free,
        }
    }

    pub fn spots(&self) -> &[ParkingSpot] {
        &self.spots
    }

    pub fn spot(&self, id: u32) -> Option<&ParkingSpot> {
        self.spots.get(id as usize)
    }

    pub fn free_count(&self, category: VehicleCategory) -> usize {
        self.free.get(&category).copied().unwrap_or(0)
    }

    pub fn has_free(&self, category: VehicleCategory) -> bool {
        self.free_count(category) > 0
    }

    pub fn capacity(&self, category: VehicleCategory) -> usize {
        self.spots.iter().filter(|s| s.category == category).count()
    }

    pub fn occupy(&mut self, spot_id: u32, vehicle: Vehicle) -> Result<(), EngineError> {
        let location = SpotLocation::new(self.number, spot_id);
        let spot = self
            .spots
            .get_mut(spot_id as usize)
            .ok_or(EngineError::SpotNotFound(location))?;
        let category = spot.category;
        spot.occupy(vehicle)?;
        if let Some(n) = self.free.get_mut(&category) {
            *n -= 1;
        }
        Ok(())
    }

    /// Vacate a spot. The free count only moves if a vehicle was actually removed.
    pub fn vacate(&mut self, spot_id: u32) -> Result<Option<Vehicle>, EngineError> {
        let location = SpotLocation::new(self.number, spot_id);
        let spot = self
            .spots
            .get_mut(spot_id as usize)
            .ok_or(EngineError::SpotNotFound(location))?;
        let removed = spot.vacate();
        if removed.is_some() {
            *self.free.entry(spot.category).or_insert(0) += 1;
        }
        Ok(removed)
    }

    pub fn snapshot(&self) -> FloorSnapshot {
        let mut free = BTreeMap::new();
        let mut capacity = BTreeMap::new();
        for spot in &self.spots {
            *capacity.entry(spot.category).or_insert(0) += 1;
            let slot = free.entry(spot.category).or_insert(0);
            if spot.is_free() {
                *slot += 1;
            }
        }
        FloorSnapshot {
            number: self.number,
            free,
            capacity,
        }
    }
}

// ── Tickets ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpotLocation {
    pub floor: u32,
    pub spot: u32,
}

impl SpotLocation {
    pub fn new(floor: u32, spot: u32) -> Self {
        Self { floor, spot }
    }
}

impl fmt::Display for SpotLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "floor {} spot {}", self.floor, self.spot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub Ulid);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TicketId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(TicketId)
    }
}

/// Issued at entry, consumed at exit. Only `exit` is ever set after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub vehicle: Vehicle,
    pub location: SpotLocation,
    pub entry: Ms,
    pub exit: Option<Ms>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub ticket: Ticket,
    pub stay: Span,
    pub fee: Amount,
}

/// Published to floor subscribers after each successful entry or exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotEvent {
    VehicleParked { ticket: Ticket },
    VehicleExited { receipt: Receipt },
}

impl LotEvent {
    pub fn floor(&self) -> u32 {
        match self {
            LotEvent::VehicleParked { ticket } => ticket.location.floor,
            LotEvent::VehicleExited { receipt } => receipt.ticket.location.floor,
        }
    }
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorSnapshot {
    pub number: u32,
    pub free: BTreeMap<VehicleCategory, usize>,
    pub capacity: BTreeMap<VehicleCategory, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LotSnapshot {
    pub floors: Vec<FloorSnapshot>,
    pub active_tickets: usize,
}
