//! Gestational age estimation.
//!
//! Every dating method is reduced to an LMP-equivalent date, from which the
//! common computation derives:
//! - Weeks + days elapsed as of a caller-supplied date
//! - Due date (Naegele's rule, LMP + 280 days)
//! - Trimester boundaries (LMP + 84, LMP + 182) and the current trimester
//!
//! `as_of` is always explicit so results never depend on the wall clock.
//! Dates must lie in [`crate::validation::SUPPORTED_YEARS`]; chrono panics on
//! arithmetic that leaves its representable range.

use crate::types::{
    DatingMethod, GestationalEstimate, Trimester, FIRST_TRIMESTER_END_DAYS, PREGNANCY_DAYS,
    SECOND_TRIMESTER_END_DAYS,
};
use chrono::{Duration, NaiveDate};

/// Embryo age that marks a blastocyst transfer
pub const BLASTOCYST_EMBRYO_DAYS: u32 = 5;

/// Gestational offset of a day-5 blastocyst transfer (14 + 5)
const BLASTOCYST_OFFSET_DAYS: i64 = 19;

/// Gestational offset of any other transfer, i.e. a day-3 embryo (14 + 3)
const CLEAVAGE_OFFSET_DAYS: i64 = 17;

/// Gestational age from the first day of the last menstrual period
pub fn from_lmp(lmp: NaiveDate, as_of: NaiveDate) -> GestationalEstimate {
    estimate(DatingMethod::Lmp, lmp, as_of)
}

/// Gestational age from an ultrasound scan dated at `usg_weeks` + `usg_days`
pub fn from_ultrasound(
    usg_date: NaiveDate,
    usg_weeks: u32,
    usg_days: u32,
    as_of: NaiveDate,
) -> GestationalEstimate {
    let total_days_at_scan = i64::from(usg_weeks) * 7 + i64::from(usg_days);
    let lmp = usg_date - Duration::days(total_days_at_scan);
    tracing::debug!(
        "Ultrasound {} at {}w{}d -> LMP-equivalent {}",
        usg_date,
        usg_weeks,
        usg_days,
        lmp
    );
    estimate(DatingMethod::Ultrasound, lmp, as_of)
}

/// Gestational age from an IVF embryo transfer
///
/// Only `embryo_days == 5` selects the blastocyst offset; every other value
/// is treated as a day-3 transfer. Reject values outside {3, 5} with
/// [`crate::validation::validate_embryo_days`] before calling.
pub fn from_embryo_transfer(
    transfer_date: NaiveDate,
    embryo_days: u32,
    as_of: NaiveDate,
) -> GestationalEstimate {
    let additional_days = if embryo_days == BLASTOCYST_EMBRYO_DAYS {
        BLASTOCYST_OFFSET_DAYS
    } else {
        CLEAVAGE_OFFSET_DAYS
    };
    let lmp = transfer_date - Duration::days(additional_days);
    tracing::debug!(
        "Day-{} transfer on {} -> LMP-equivalent {}",
        embryo_days,
        transfer_date,
        lmp
    );
    estimate(DatingMethod::EmbryoTransfer, lmp, as_of)
}

/// Common computation shared by all dating methods
///
/// When `as_of` precedes the LMP-equivalent date, `elapsed_days` is negative
/// while `weeks`/`days` saturate at zero and the trimester reads as first.
fn estimate(method: DatingMethod, lmp: NaiveDate, as_of: NaiveDate) -> GestationalEstimate {
    let due_date = lmp + Duration::days(PREGNANCY_DAYS);
    let elapsed_days = (as_of - lmp).num_days();
    let counted = elapsed_days.max(0);

    let result = GestationalEstimate {
        method,
        lmp_equivalent: lmp,
        weeks: (counted / 7) as u32,
        days: (counted % 7) as u32,
        elapsed_days,
        due_date,
        days_until_due: (due_date - as_of).num_days(),
        first_trimester_end: lmp + Duration::days(FIRST_TRIMESTER_END_DAYS),
        second_trimester_end: lmp + Duration::days(SECOND_TRIMESTER_END_DAYS),
        current_trimester: Trimester::from_elapsed_days(elapsed_days),
    };

    tracing::debug!(
        "{:?} dating as of {}: {}w{}d, due {}, trimester {}",
        method,
        as_of,
        result.weeks,
        result.days,
        result.due_date,
        result.current_trimester
    );

    result
}
