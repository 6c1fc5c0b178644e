use crate::classify::classify;
use crate::endpoints::{is_valid_source, is_valid_target};
use crate::play::{Play, PlayId};
use crate::situation::SituationState;
use crate::summary;

/// Which rule decided the target state of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    SourceTurnover,
    TargetPunt,
    TargetFieldGoal,
    PenaltyEndOfHalf,
    PenaltyFirstDown,
    PenaltyClassified,
    GainedFirstDown,
    BoundaryReached,
    Classified,
    /// Yardage applied but nothing else matched; resolved to `Unknown`.
    Unresolved,
    NoYardage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Position of the source play in the sequenced slice.
    pub source: usize,
    /// Position of the target play in the sequenced slice.
    pub target: usize,
    pub source_id: PlayId,
    pub target_id: PlayId,
    pub source_state: SituationState,
    pub target_state: SituationState,
    pub resolution: Resolution,
    pub label: String,
}

/// Outcome of one cursor step over the play index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Pair { source: usize, target: usize },
    Exhausted,
}

/// Walks the ordered plays with two cursors.
///
/// `next_source` is where the next source search starts. After a pair is
/// found it moves to the target position, so the consumed target may start the
/// next transition but no play is ever used as a source twice.
struct Cursor<'a> {
    plays: &'a [Play],
    next_source: usize,
}

impl<'a> Cursor<'a> {
    fn new(plays: &'a [Play]) -> Self {
        Self {
            plays,
            next_source: 0,
        }
    }

    fn step(&mut self) -> Step {
        let len = self.plays.len();
        let Some(source) = (self.next_source..len).find(|&i| is_valid_source(&self.plays[i]))
        else {
            self.next_source = len;
            return Step::Exhausted;
        };
        // The target search always starts strictly after the source.
        let Some(target) = (source + 1..len).find(|&j| is_valid_target(&self.plays[j])) else {
            self.next_source = len;
            return Step::Exhausted;
        };
        self.next_source = target;
        Step::Pair { source, target }
    }
}

/// Pair every valid source with the next valid target and resolve the
/// destination state of each transition. `wrap_width` controls the label text.
pub fn sequence(plays: &[Play], wrap_width: usize) -> Vec<Transition> {
    let mut cursor = Cursor::new(plays);
    let mut out = Vec::new();

    while let Step::Pair { source, target } = cursor.step() {
        let src = &plays[source];
        let tgt = &plays[target];
        let source_state = classify(src);
        let (target_state, resolution) = resolve_target(src, tgt);

        log::trace!(
            "play {} -> play {}: {:?} -> {:?} ({:?})",
            src.id,
            tgt.id,
            source_state,
            target_state,
            resolution
        );
        if resolution == Resolution::Unresolved {
            log::debug!(
                "play {} -> play {} matched no rule, resolved to Unknown",
                src.id,
                tgt.id
            );
        }

        out.push(Transition {
            source,
            target,
            source_id: src.id,
            target_id: tgt.id,
            source_state,
            target_state,
            resolution,
            label: summary::summary_label(src, wrap_width),
        });
    }

    out
}

/// Precedence: turnover, punt, field goal, penalty, yardage, then no yardage.
pub fn resolve_target(src: &Play, tgt: &Play) -> (SituationState, Resolution) {
    if src.is_turnover {
        return (SituationState::Turnover, Resolution::SourceTurnover);
    }
    if tgt.is_punt {
        return (SituationState::Punt, Resolution::TargetPunt);
    }
    if tgt.is_fieldgoal {
        return (SituationState::FieldGoalAttempt, Resolution::TargetFieldGoal);
    }
    if src.is_penalty {
        return resolve_after_penalty(src, tgt);
    }
    if let Some(gained) = src.yds_gained {
        return resolve_after_gain(src, tgt, gained);
    }
    (SituationState::Shenanigans, Resolution::NoYardage)
}

fn resolve_after_penalty(src: &Play, tgt: &Play) -> (SituationState, Resolution) {
    let Some(tgt_dist) = tgt.dist else {
        return (SituationState::EndOfHalf, Resolution::PenaltyEndOfHalf);
    };

    if tgt.regular_down() == Some(1) {
        if let (Some(src_fp), Some(src_dist), Some(tgt_fp)) =
            (src.off_fieldpos, src.dist, tgt.off_fieldpos)
        {
            let src_first_down_yard = src_fp + src_dist;
            let tgt_first_down_yard = tgt_fp + tgt_dist;
            if src_first_down_yard != tgt_first_down_yard || src_fp <= tgt_fp {
                return (
                    SituationState::FirstDownOrTouchdown,
                    Resolution::PenaltyFirstDown,
                );
            }
        }
    }

    (classify(tgt), Resolution::PenaltyClassified)
}

fn resolve_after_gain(src: &Play, tgt: &Play, gained: i32) -> (SituationState, Resolution) {
    if src.dist.is_some_and(|dist| gained >= dist) {
        return (
            SituationState::FirstDownOrTouchdown,
            Resolution::GainedFirstDown,
        );
    }
    if tgt.marks_boundary() {
        return (SituationState::EndOfHalf, Resolution::BoundaryReached);
    }
    match tgt.regular_down() {
        Some(2..=4) => (classify(tgt), Resolution::Classified),
        _ => (SituationState::Unknown, Resolution::Unresolved),
    }
}
