use serde::Serialize;

use crate::models::Source;

/// Indicators closer than this (in percentage points) share a stack.
pub const STACK_PROXIMITY: f64 = 1.0;
pub const BASE_Z_INDEX: u32 = 10;
pub const STACK_OFFSET_PX: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IndicatorKind {
    Source(Source),
    LocalField,
    LocalLab,
    FieldLab,
    AllSources,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub kind: IndicatorKind,
    pub position: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedIndicator {
    pub kind: IndicatorKind,
    pub position: f64,
    pub level: u32,
    pub z_index: u32,
    pub offset_px: f64,
}

/// Assigns each indicator a stacking level so no two indicators within
/// `STACK_PROXIMITY` of each other share a level.
///
/// Output is ordered by position; ties keep their input order.
pub fn stack_indicators(indicators: &[Indicator]) -> Vec<PlacedIndicator> {
    let mut ordered = indicators.to_vec();
    ordered.sort_by(|a, b| a.position.total_cmp(&b.position));

    let mut placed: Vec<PlacedIndicator> = Vec::with_capacity(ordered.len());
    for indicator in ordered {
        let taken: Vec<u32> = placed
            .iter()
            .filter(|other| (other.position - indicator.position).abs() <= STACK_PROXIMITY)
            .map(|other| other.level)
            .collect();
        // Lowest level no close neighbour occupies.
        let level = (0..)
            .find(|level| !taken.contains(level))
            .unwrap_or(taken.len() as u32);

        placed.push(PlacedIndicator {
            kind: indicator.kind,
            position: indicator.position,
            level,
            z_index: BASE_Z_INDEX + level,
            offset_px: level as f64 * STACK_OFFSET_PX,
        });
    }

    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator(kind: IndicatorKind, position: f64) -> Indicator {
        Indicator { kind, position }
    }

    #[test]
    fn close_indicators_stack() {
        let placed = stack_indicators(&[
            indicator(IndicatorKind::Source(Source::Local), 30.0),
            indicator(IndicatorKind::Source(Source::Field), 30.5),
            indicator(IndicatorKind::LocalField, 30.0),
        ]);

        let levels: Vec<u32> = placed.iter().map(|p| p.level).collect();
        assert_eq!(levels, vec![0, 1, 2]);
        assert_eq!(placed[0].kind, IndicatorKind::Source(Source::Local));
        assert_eq!(placed[1].kind, IndicatorKind::LocalField);
        assert_eq!(placed[2].z_index, BASE_Z_INDEX + 2);
        assert_eq!(placed[2].offset_px, 2.0 * STACK_OFFSET_PX);
    }

    #[test]
    fn chained_neighbours_never_share_a_level() {
        let placed = stack_indicators(&[
            indicator(IndicatorKind::Source(Source::Local), 10.0),
            indicator(IndicatorKind::Source(Source::Field), 10.9),
            indicator(IndicatorKind::Source(Source::Lab), 11.8),
            indicator(IndicatorKind::FieldLab, 12.7),
        ]);

        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                if (a.position - b.position).abs() <= STACK_PROXIMITY {
                    assert_ne!(a.level, b.level, "{} and {} overlap", a.position, b.position);
                }
            }
        }
        // 10.0 and 11.8 are 1.8 apart, so the third marker drops back down.
        let levels: Vec<u32> = placed.iter().map(|p| p.level).collect();
        assert_eq!(levels, vec![0, 1, 0, 1]);
    }

    #[test]
    fn distant_indicators_stay_on_base_level() {
        let placed = stack_indicators(&[
            indicator(IndicatorKind::Source(Source::Lab), 80.0),
            indicator(IndicatorKind::Source(Source::Local), 10.0),
            indicator(IndicatorKind::Source(Source::Field), 45.0),
        ]);

        assert!(placed.iter().all(|p| p.level == 0 && p.offset_px == 0.0));
        assert_eq!(placed[0].position, 10.0);
        assert_eq!(placed[2].position, 80.0);
    }
}
