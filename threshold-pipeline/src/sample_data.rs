//! Canned fulfillment log so the tool can be tried without an upload.
//!
//! Three ISO weeks (2024-W10 to 2024-W12) for four SKUs, in the legacy
//! column layout. "Huevos 12u" loses shelf capacity week over week.

use threshold_core::{FulfillmentEvent, ThresholdResult};

use crate::event_loader::load_events;

pub const SAMPLE_CSV: &str = "\
nombre_item,creacion_job,unidades_pedidas,unidades_encontradas,estado_item
Leche Entera 1L,2024-03-04 08:10:00,10,10,ADDED
Leche Entera 1L,2024-03-04 09:45:00,5,5,ADDED
Leche Entera 1L,2024-03-04 12:20:00,3,2,ADDED
Leche Entera 1L,2024-03-04 17:05:00,4,4,ADDED
Pan Molde,2024-03-04 10:00:00,6,6,ADDED
Pan Molde,2024-03-04 15:30:00,6,6,ADDED
Huevos 12u,2024-03-05 08:00:00,12,12,ADDED
Huevos 12u,2024-03-05 11:15:00,8,8,ADDED
Leche Entera 1L,2024-03-06 09:00:00,10,10,ADDED
Leche Entera 1L,2024-03-06 13:40:00,5,4,ADDED
Aceite Oliva 1L,2024-03-07 10:30:00,2,2,ADDED
Aceite Oliva 1L,2024-03-07 16:00:00,2,2,REMOVED
Aceite Oliva 1L,2024-03-07 18:10:00,1,1,ADDED
Huevos 12u,2024-03-11 08:05:00,12,12,ADDED
Huevos 12u,2024-03-11 10:50:00,6,5,ADDED
Pan Molde,2024-03-12 09:20:00,6,6,ADDED
Pan Molde,2024-03-12 12:00:00,4,4,ADDED
Pan Molde,2024-03-12 18:30:00,3,3,ADDED
Leche Entera 1L,2024-03-13 08:30:00,12,12,ADDED
Leche Entera 1L,2024-03-13 11:00:00,6,6,ADDED
Aceite Oliva 1L,2024-03-14 09:10:00,3,0,ADDED
Aceite Oliva 1L,2024-03-14 12:45:00,2,2,ADDED
Huevos 12u,2024-03-18 09:00:00,6,6,ADDED
Huevos 12u,2024-03-18 10:30:00,6,3,ADDED
Huevos 12u,2024-03-20 08:45:00,4,4,ADDED
Huevos 12u,2024-03-20 09:15:00,4,4,removed
Leche Entera 1L,2024-03-19 08:00:00,10,10,ADDED
Leche Entera 1L,2024-03-19 10:00:00,5,5,ADDED
Pan Molde,2024-03-21 11:00:00,6,6,ADDED
Pan Molde,2024-03-21 14:00:00,6,5,ADDED
";

/// Parse the canned dataset.
pub fn sample_events() -> ThresholdResult<Vec<FulfillmentEvent>> {
    load_events(SAMPLE_CSV.as_bytes())
}
