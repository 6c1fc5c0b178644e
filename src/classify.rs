use crate::play::Play;
use crate::situation::SituationState;

/// Map a play's down, distance and field position to one of the down/distance
/// buckets, falling back to `Unknown` for anything the buckets do not cover.
pub fn classify(play: &Play) -> SituationState {
    let (Some(down), Some(dist)) = (play.regular_down(), play.dist) else {
        return SituationState::Unknown;
    };
    classify_down_distance(down, dist, play.off_fieldpos)
}

pub fn classify_down_distance(down: u8, dist: i32, off_fieldpos: Option<i32>) -> SituationState {
    // Distance to the opponent goal line; unknown field position never matches.
    let to_goal = off_fieldpos.map(|fp| 50 - fp);

    match down {
        1 => {
            if dist == 10 || to_goal == Some(dist) {
                SituationState::FirstAndTen
            } else if dist > 10 {
                SituationState::FirstAndLong
            } else if dist < 10 && to_goal.is_some_and(|g| dist < g) {
                SituationState::FirstAndShort
            } else {
                SituationState::Unknown
            }
        }
        2 => match dist {
            d if d < 6 => SituationState::SecondAndShort,
            6..=10 => SituationState::SecondAndMedium,
            _ => SituationState::SecondAndLong,
        },
        3 => match dist {
            d if d < 4 => SituationState::ThirdAndShort,
            4..=7 => SituationState::ThirdAndMedium,
            _ => SituationState::ThirdAndLong,
        },
        4 => SituationState::FourthDown,
        _ => SituationState::Unknown,
    }
}
