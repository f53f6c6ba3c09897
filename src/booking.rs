//! Ride-booking vocabulary: column names, categorical values and the typed row.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::table::Table;

pub const BOOKING_STATUS: &str = "Booking Status";
pub const CUSTOMER_CANCEL_REASON: &str = "Reason for cancelling by Customer";
pub const DRIVER_CANCEL_REASON: &str = "Driver Cancellation Reason";
pub const PICKUP_LOCATION: &str = "Pickup Location";
pub const BOOKING_VALUE: &str = "Booking Value";
pub const VEHICLE_TYPE: &str = "Vehicle Type";
pub const RIDE_DISTANCE: &str = "Ride Distance";

/// Columns the five questions need, in projection order.
pub const ANALYSIS_COLUMNS: [&str; 7] = [
    BOOKING_STATUS,
    CUSTOMER_CANCEL_REASON,
    DRIVER_CANCEL_REASON,
    PICKUP_LOCATION,
    BOOKING_VALUE,
    VEHICLE_TYPE,
    RIDE_DISTANCE,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BookingStatus {
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Cancelled by Driver")]
    CancelledByDriver,
    #[serde(rename = "Cancelled by Customer")]
    CancelledByCustomer,
    #[serde(rename = "Incomplete")]
    Incomplete,
    #[serde(rename = "No Driver Found")]
    NoDriverFound,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Completed,
        BookingStatus::CancelledByDriver,
        BookingStatus::CancelledByCustomer,
        BookingStatus::Incomplete,
        BookingStatus::NoDriverFound,
    ];

    /// The label used for this status in the dataset.
    pub fn label(self) -> &'static str {
        match self {
            BookingStatus::Completed => "Completed",
            BookingStatus::CancelledByDriver => "Cancelled by Driver",
            BookingStatus::CancelledByCustomer => "Cancelled by Customer",
            BookingStatus::Incomplete => "Incomplete",
            BookingStatus::NoDriverFound => "No Driver Found",
        }
    }

    /// True when the given cancellation reasons may appear with this status.
    pub fn admits_reasons(self, customer_reason: Option<&str>, driver_reason: Option<&str>) -> bool {
        (customer_reason.is_none() || self == BookingStatus::CancelledByCustomer)
            && (driver_reason.is_none() || self == BookingStatus::CancelledByDriver)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.label() == s)
            .ok_or_else(|| format!("unknown booking status '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VehicleType {
    #[serde(rename = "Go Mini")]
    GoMini,
    #[serde(rename = "Go Sedan")]
    GoSedan,
    #[serde(rename = "Auto")]
    Auto,
    #[serde(rename = "Bike")]
    BikeOrEbike,
    #[serde(rename = "Uber XL")]
    UberXL,
    #[serde(rename = "Premier Sedan")]
    PremierSedan,
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Go Mini" => Ok(VehicleType::GoMini),
            "Go Sedan" => Ok(VehicleType::GoSedan),
            "Auto" => Ok(VehicleType::Auto),
            "Bike" | "eBike" => Ok(VehicleType::BikeOrEbike),
            "Uber XL" => Ok(VehicleType::UberXL),
            "Premier Sedan" => Ok(VehicleType::PremierSedan),
            other => Err(format!("unknown vehicle type '{other}'")),
        }
    }
}

/// A single ride-booking row decoded from the projected table.
///
/// Empty fields decode to `None`; for fares and reasons that absence carries
/// meaning (the ride was not charged, or not cancelled by that party).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub booking_status: BookingStatus,
    pub customer_cancel_reason: Option<String>,
    pub driver_cancel_reason: Option<String>,
    pub pickup_location: String,
    pub booking_value: Option<f64>,
    pub vehicle_type: VehicleType,
    pub ride_distance: Option<f64>,
}

impl Booking {
    /// Decodes every row of `table`, one column at a time.
    ///
    /// # Errors
    ///
    /// [`Error::Schema`] naming the column of the first cell that is missing
    /// where required or does not parse.
    pub fn from_table(table: &Table) -> Result<Vec<Booking>> {
        let mut statuses = table.parsed_column::<BookingStatus>(BOOKING_STATUS)?.into_iter();
        let mut customer = table.parsed_column::<String>(CUSTOMER_CANCEL_REASON)?.into_iter();
        let mut driver = table.parsed_column::<String>(DRIVER_CANCEL_REASON)?.into_iter();
        let mut pickups = table.parsed_column::<String>(PICKUP_LOCATION)?.into_iter();
        let mut fares = table.numeric_column(BOOKING_VALUE)?.into_iter();
        let mut vehicles = table.parsed_column::<VehicleType>(VEHICLE_TYPE)?.into_iter();
        let mut distances = table.numeric_column(RIDE_DISTANCE)?.into_iter();

        (0..table.len())
            .map(|row| {
                Ok(Booking {
                    booking_status: required(table, BOOKING_STATUS, row, statuses.next().flatten())?,
                    customer_cancel_reason: customer.next().flatten(),
                    driver_cancel_reason: driver.next().flatten(),
                    pickup_location: required(table, PICKUP_LOCATION, row, pickups.next().flatten())?,
                    booking_value: fares.next().flatten(),
                    vehicle_type: required(table, VEHICLE_TYPE, row, vehicles.next().flatten())?,
                    ride_distance: distances.next().flatten(),
                })
            })
            .collect()
    }

    /// True when the cancellation reasons agree with the booking status.
    pub fn reasons_consistent(&self) -> bool {
        self.booking_status.admits_reasons(
            self.customer_cancel_reason.as_deref(),
            self.driver_cancel_reason.as_deref(),
        )
    }
}

fn required<T>(table: &Table, column: &str, row: usize, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| Error::Schema {
        column: column.to_string(),
        reason: format!("row {} has no value", table.source_row(row)),
    })
}
