use flood_core::{FloodError, FloodResult};

const OPERATIONS_TOTAL: &str = "flood_dispatch_operations_total";
const REJECTIONS_TOTAL: &str = "flood_dispatch_rejections_total";
const SUPPLY_UNITS_CONSUMED_TOTAL: &str = "flood_dispatch_supply_units_consumed_total";

pub(crate) fn observe<T>(operation: &'static str, result: FloodResult<T>) -> FloodResult<T> {
    match &result {
        Ok(_) => metrics::counter!(OPERATIONS_TOTAL, "operation" => operation).increment(1),
        Err(err) => rejected(operation, err),
    }
    result
}

fn rejected(operation: &'static str, err: &FloodError) {
    let code = err.code();
    tracing::warn!(operation, code = %code, error = %err, "dispatch operation rejected");
    metrics::counter!(REJECTIONS_TOTAL, "operation" => operation, "code" => code.as_str())
        .increment(1);
}

pub(crate) fn supply_consumed(units: u64) {
    metrics::counter!(SUPPLY_UNITS_CONSUMED_TOTAL).increment(units);
}
