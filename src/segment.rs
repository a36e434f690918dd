//! Turns an arrow-annotated, linear-reference-ordered chain of panels on one
//! (street, side, regulation) triplet into a list of half-open intervals.
//!
//! Grounded on spec §4.9: a two-state (open/closed) machine folded over the
//! sorted panel sequence. `NO_ARROW` is a point-of-presence: while the
//! window is already open it closes the current interval and immediately
//! reopens one at the same abscissa (this is how S5 produces two adjoining
//! segments from START/NO_ARROW/END).

use crate::enums::Arrow;

#[derive(Debug, Clone, Copy)]
pub struct ChainEntry<'a> {
    pub panel_id: &'a str,
    pub abscissa: f64,
    pub arrow: Arrow,
}

/// A built interval, in normalised (pre-direction-inversion) abscissa space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

/// Builds segments from a chain already sorted by ascending linear
/// reference. Returns the intervals plus the ids of panels whose arrow
/// transition violated the state machine (double-open / orphan-close).
pub fn build_segments(chain: &[ChainEntry<'_>]) -> (Vec<Interval>, Vec<String>) {
    let mut intervals = Vec::new();
    let mut problems = Vec::new();

    let mut open: Option<f64> = None;

    for entry in chain {
        match entry.arrow {
            Arrow::Start => match open {
                None => open = Some(entry.abscissa),
                Some(_) => {
                    log::warn!(
                        "panel {}: regulation already open, ignoring duplicate START",
                        entry.panel_id
                    );
                    problems.push(entry.panel_id.to_string());
                }
            },
            Arrow::End => match open {
                None => {
                    log::warn!(
                        "panel {}: regulation closed without open",
                        entry.panel_id
                    );
                    problems.push(entry.panel_id.to_string());
                }
                Some(start) => {
                    intervals.push(Interval {
                        start,
                        end: entry.abscissa,
                    });
                    open = None;
                }
            },
            Arrow::NoArrow => match open {
                None => open = Some(entry.abscissa),
                Some(start) => {
                    intervals.push(Interval {
                        start,
                        end: entry.abscissa,
                    });
                    open = Some(entry.abscissa);
                }
            },
        }
    }

    if let Some(start) = open {
        intervals.push(Interval {
            start,
            end: f64::INFINITY,
        });
    }

    (intervals, problems)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn start_no_arrow_end_yields_two_segments() {
        let chain = vec![
            ChainEntry { panel_id: "a", abscissa: 10.0, arrow: Arrow::Start },
            ChainEntry { panel_id: "b", abscissa: 40.0, arrow: Arrow::NoArrow },
            ChainEntry { panel_id: "c", abscissa: 80.0, arrow: Arrow::End },
        ];
        let (intervals, problems) = build_segments(&chain);
        assert!(problems.is_empty());
        assert_eq!(
            intervals,
            vec![
                Interval { start: 10.0, end: 40.0 },
                Interval { start: 40.0, end: 80.0 },
            ]
        );
    }

    #[test]
    fn double_start_is_flagged() {
        let chain = vec![
            ChainEntry { panel_id: "a", abscissa: 10.0, arrow: Arrow::Start },
            ChainEntry { panel_id: "b", abscissa: 20.0, arrow: Arrow::Start },
            ChainEntry { panel_id: "c", abscissa: 30.0, arrow: Arrow::End },
        ];
        let (intervals, problems) = build_segments(&chain);
        assert_eq!(problems, vec!["b".to_string()]);
        assert_eq!(intervals, vec![Interval { start: 10.0, end: 30.0 }]);
    }

    #[test]
    fn orphan_end_is_flagged_and_ignored() {
        let chain = vec![ChainEntry { panel_id: "a", abscissa: 10.0, arrow: Arrow::End }];
        let (intervals, problems) = build_segments(&chain);
        assert_eq!(problems, vec!["a".to_string()]);
        assert!(intervals.is_empty());
    }

    #[test]
    fn unterminated_chain_closes_at_infinity() {
        let chain = vec![ChainEntry { panel_id: "a", abscissa: 10.0, arrow: Arrow::Start }];
        let (intervals, _) = build_segments(&chain);
        assert_eq!(intervals, vec![Interval { start: 10.0, end: f64::INFINITY }]);
    }
}
