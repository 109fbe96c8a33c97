use chrono::{Duration, NaiveDateTime};

use super::error::ValidationError;
use super::shift::{LunchWindow, overlap, to_hours};
use crate::model::attendance::AttendanceRecord;

/// Net hours worked: elapsed time minus the part spent inside the lunch
/// window of the check-in day. An open record counts as 0.
pub fn compute_net_hours(
    check_in: NaiveDateTime,
    check_out: Option<NaiveDateTime>,
    lunch: &LunchWindow,
) -> Result<f64, ValidationError> {
    let Some(check_out) = check_out else {
        return Ok(0.0);
    };
    if check_out < check_in {
        return Err(ValidationError::CheckOutBeforeCheckIn {
            record_id: None,
            check_in,
            check_out,
        });
    }

    let gross = check_out - check_in;
    let in_lunch = overlap((check_in, check_out), lunch.on(check_in.date()));
    Ok(to_hours((gross - in_lunch).max(Duration::zero())))
}

impl AttendanceRecord {
    pub fn net_hours(&self, lunch: &LunchWindow) -> Result<f64, ValidationError> {
        compute_net_hours(self.check_in, self.check_out, lunch).map_err(|e| match e {
            ValidationError::CheckOutBeforeCheckIn {
                check_in,
                check_out,
                ..
            } => ValidationError::CheckOutBeforeCheckIn {
                record_id: Some(self.id),
                check_in,
                check_out,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 6)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn lunch() -> LunchWindow {
        LunchWindow::default()
    }

    #[test]
    fn full_day_deducts_one_hour_of_lunch() {
        assert_eq!(compute_net_hours(at(8, 0), Some(at(17, 0)), &lunch()).unwrap(), 8.0);
    }

    #[test]
    fn shift_inside_lunch_is_zero() {
        assert_eq!(compute_net_hours(at(12, 30), Some(at(12, 45)), &lunch()).unwrap(), 0.0);
    }

    #[test]
    fn no_overlap_is_plain_elapsed_time() {
        let cases = [
            (at(6, 40), at(11, 55)),
            (at(13, 0), at(18, 20)),
            (at(7, 0), at(7, 0)),
            (at(14, 7), at(14, 8)),
        ];
        for (check_in, check_out) in cases {
            let expected = (check_out - check_in).num_minutes() as f64 / 60.0;
            assert_eq!(
                compute_net_hours(check_in, Some(check_out), &lunch()).unwrap(),
                expected,
                "{check_in} -> {check_out}"
            );
        }
    }

    #[test]
    fn partial_overlap_deducts_only_the_shared_part() {
        // 12:40 -> 17:00 is 4h20m gross, 20m of it inside lunch
        assert_eq!(compute_net_hours(at(12, 40), Some(at(17, 0)), &lunch()).unwrap(), 4.0);
        // 09:00 -> 12:15 is 3h15m gross, 15m of it inside lunch
        assert_eq!(compute_net_hours(at(9, 0), Some(at(12, 15)), &lunch()).unwrap(), 3.0);
    }

    #[test]
    fn open_record_has_no_hours() {
        assert_eq!(compute_net_hours(at(8, 0), None, &lunch()).unwrap(), 0.0);
    }

    #[test]
    fn reversed_range_is_a_validation_error() {
        let err = compute_net_hours(at(17, 0), Some(at(8, 0)), &lunch()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::CheckOutBeforeCheckIn {
                record_id: None,
                check_in: at(17, 0),
                check_out: at(8, 0),
            }
        );
    }

    #[test]
    fn custom_lunch_window() {
        let window = LunchWindow::new(
            NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(compute_net_hours(at(8, 0), Some(at(17, 0)), &window).unwrap(), 8.5);
    }

    #[test]
    fn record_errors_carry_the_record_id() {
        let mut record = AttendanceRecord::new(
            77,
            1,
            at(0, 0).date(),
            at(8, 0),
            None,
            crate::model::attendance::AttendanceStatus::Late,
            at(8, 0),
        )
        .unwrap();
        record.check_out = Some(at(7, 0));

        let err = record.net_hours(&lunch()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::CheckOutBeforeCheckIn { record_id: Some(77), .. }
        ));
    }
}
