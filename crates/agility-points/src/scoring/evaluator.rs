use serde::Serialize;

use super::domain::{Run, RunScoring};
use super::rules::{ScoringRule, ScoringStyle, ScoringType};
use crate::config::ScoringOptions;

/// Obstacles-per-second numerator used for speed-only events.
const SPEED_OPS_FACTOR: f64 = 204.545;
/// Seconds credited for the table when it is excluded from rates.
const TABLE_SECONDS: f64 = 5.0;

/// A per-second rate together with the decimals it is displayed with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rate {
    pub value: f64,
    pub precision: usize,
}

impl Rate {
    fn new(value: f64, precision: usize) -> Self {
        Self { value, precision }
    }

    pub fn display(&self) -> String {
        format!("{:.*}", self.precision, self.value)
    }
}

/// Derived values for one run. Every field is absent when no rule applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluatedRun<'a> {
    #[serde(skip)]
    pub rule: Option<&'a ScoringRule>,
    pub scoring_type: Option<ScoringType>,
    pub time_faults: Option<f64>,
    pub total_faults: Option<f64>,
    pub score: Option<f64>,
    pub title_points: Option<f64>,
    /// True when the qualifying run carried no faults.
    pub clean: bool,
    pub speed_points: Option<i32>,
    pub lifetime_points: Option<f64>,
    pub placement_points: Option<f64>,
    /// Opening (or single) and closing points the run had to reach.
    pub required_open_points: Option<f64>,
    pub required_close_points: Option<f64>,
    pub yps: Option<Rate>,
    pub min_yps: Option<Rate>,
    pub ops: Option<Rate>,
}

impl<'a> EvaluatedRun<'a> {
    fn unscored() -> Self {
        Self {
            rule: None,
            scoring_type: None,
            time_faults: None,
            total_faults: None,
            score: None,
            title_points: None,
            clean: false,
            speed_points: None,
            lifetime_points: None,
            placement_points: None,
            required_open_points: None,
            required_close_points: None,
            yps: None,
            min_yps: None,
            ops: None,
        }
    }
}

/// Pure scoring calculator parameterized by the rate switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunEvaluator {
    options: ScoringOptions,
}

impl RunEvaluator {
    pub fn new(options: ScoringOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ScoringOptions {
        self.options
    }

    pub fn evaluate<'a>(&self, run: &Run, rule: Option<&'a ScoringRule>) -> EvaluatedRun<'a> {
        let Some(rule) = rule else {
            return EvaluatedRun::unscored();
        };

        let scoring = &run.scoring;
        let kind = rule.scoring_type();
        let time_faults = time_faults(scoring, rule);
        let qualified = run.q.qualified();

        let (title_points, clean) = if qualified {
            let (points, clean) = title_points(scoring, rule, time_faults);
            (Some(points), clean)
        } else {
            (Some(0.0), false)
        };

        let speed_points = (rule.speed_points && qualified).then(|| speed_points(run, rule));
        let lifetime_points = (rule.carries_lifetime() && qualified)
            .then(|| lifetime_points(scoring, rule, time_faults, speed_points));
        let placement_points =
            (rule.carries_placement() && qualified).then(|| rule.placement_points_for(run.place));

        let (need_open, need_close) = rule.required_points(scoring);

        EvaluatedRun {
            rule: Some(rule),
            scoring_type: Some(kind),
            time_faults: Some(time_faults),
            total_faults: Some(scoring.course_faults + time_faults),
            score: score(scoring, rule, time_faults),
            title_points,
            clean,
            speed_points,
            lifetime_points,
            placement_points,
            required_open_points: Some(need_open),
            required_close_points: Some(need_close),
            yps: self.yps(scoring, kind),
            min_yps: self.min_yps(scoring, kind),
            ops: self.ops(scoring, kind),
        }
    }

    fn table_adjusted(&self, scoring: &RunScoring, time: f64) -> f64 {
        if scoring.table && time > TABLE_SECONDS && !self.options.table_in_yps {
            time - TABLE_SECONDS
        } else {
            time
        }
    }

    fn yps(&self, scoring: &RunScoring, kind: ScoringType) -> Option<Rate> {
        if !matches!(kind, ScoringType::ByTime | ScoringType::BySpeed)
            || scoring.yards <= 0.0
            || scoring.time <= 0.0
        {
            return None;
        }
        let time = self.table_adjusted(scoring, scoring.time);
        Some(Rate::new(scoring.yards / time, 3))
    }

    fn min_yps(&self, scoring: &RunScoring, kind: ScoringType) -> Option<Rate> {
        if kind != ScoringType::ByTime || scoring.yards <= 0.0 || scoring.sct <= 0.0 {
            return None;
        }
        let time = self.table_adjusted(scoring, scoring.sct);
        Some(Rate::new(scoring.yards / time, 3))
    }

    fn ops(&self, scoring: &RunScoring, kind: ScoringType) -> Option<Rate> {
        let time = scoring.time;
        if time <= 0.0 {
            return None;
        }
        if kind == ScoringType::BySpeed {
            return Some(Rate::new(SPEED_OPS_FACTOR / time, 2));
        }
        if scoring.obstacles == 0 {
            return None;
        }
        let time = match kind {
            ScoringType::ByTime => self.table_adjusted(scoring, time),
            ScoringType::ByOpenClose
                if !self.options.run_time_in_ops && time > scoring.sct && scoring.sct2 > 0.0 =>
            {
                scoring.sct
            }
            _ => time,
        };
        Some(Rate::new(f64::from(scoring.obstacles) / time, 3))
    }
}

/// Time faults before the multiplier is applied.
///
/// With `drop_fractions` the elapsed time is rounded toward the threshold
/// side that favors the dog: floor when over, ceiling when under.
fn time_faults(scoring: &RunScoring, rule: &ScoringRule) -> f64 {
    let kind = rule.scoring_type();
    if !kind.has_time_faults() {
        return 0.0;
    }

    let mut threshold = scoring.sct;
    let (under, over) = if kind != ScoringType::ByTime {
        threshold += scoring.sct2;
        (rule.time_faults_under, rule.time_faults_over)
    } else if rule.style == ScoringStyle::TimePlusFaults {
        (rule.time_faults_under, rule.time_faults_over)
    } else {
        (false, true)
    };

    let mut faults = 0.0;
    if threshold > 0.0 {
        if under {
            let time = if rule.drop_fractions {
                scoring.time.ceil()
            } else {
                scoring.time
            };
            if time < threshold {
                faults = threshold - time;
            }
        }
        if over {
            let time = if rule.drop_fractions {
                scoring.time.floor()
            } else {
                scoring.time
            };
            if time > threshold {
                faults = time - threshold;
            }
        }
    }
    faults * rule.effective_time_fault_multiplier()
}

fn score(scoring: &RunScoring, rule: &ScoringRule, time_faults: f64) -> Option<f64> {
    match rule.scoring_type() {
        ScoringType::ByTime | ScoringType::BySpeed => {
            let faults = scoring.course_faults + time_faults;
            Some(match rule.style {
                ScoringStyle::TimePlusFaults => faults + scoring.time,
                ScoringStyle::Faults100ThenTime => (100.0 - faults).max(0.0),
                ScoringStyle::Faults200ThenTime => (200.0 - faults).max(0.0),
                _ => faults,
            })
        }
        ScoringType::ByOpenClose => {
            let mut points = scoring.open_points + scoring.close_points - scoring.course_faults;
            if rule.subtract_time_faults {
                points -= time_faults;
            }
            Some(points)
        }
        ScoringType::ByPoints => {
            let mut points = scoring.open_points - scoring.course_faults;
            if rule.subtract_time_faults {
                points -= time_faults;
            }
            Some(points)
        }
        ScoringType::ByPass => None,
    }
}

/// Fault figure used for the title and lifetime lookups; `None` means the
/// run earns nothing despite qualifying.
fn lookup_faults(scoring: &RunScoring, rule: &ScoringRule, time_faults: f64) -> Option<(f64, bool)> {
    match rule.scoring_type() {
        ScoringType::ByTime | ScoringType::BySpeed => {
            let mut faults = scoring.course_faults + time_faults;
            let clean = faults == 0.0;
            if rule.style != ScoringStyle::TimePlusFaults {
                return Some((faults, clean));
            }
            if rule.qs_must_be_clean && faults > 0.0 {
                return None;
            }
            if rule.titling_points_raw_faults {
                return (scoring.time + faults <= scoring.sct).then_some((faults, clean));
            }
            if scoring.sct > 0.0 {
                faults = (faults + scoring.time - scoring.sct).max(0.0);
            }
            Some((faults, clean))
        }
        ScoringType::ByOpenClose => {
            let (need_open, need_close) = rule.required_points(scoring);
            let met = (need_open <= scoring.open_points && need_close <= scoring.close_points)
                || (need_close == 0.0 && need_open <= scoring.open_points + scoring.close_points);
            let required = need_open + need_close;
            met.then(|| (forgiven_time_faults(scoring, rule, time_faults, required), true))
        }
        ScoringType::ByPoints => {
            let (need_open, _) = rule.required_points(scoring);
            (need_open <= scoring.open_points).then(|| {
                (forgiven_time_faults(scoring, rule, time_faults, need_open), true)
            })
        }
        ScoringType::ByPass => Some((0.0, false)),
    }
}

/// Subtracted time faults are dropped when the score still meets `required`.
fn forgiven_time_faults(
    scoring: &RunScoring,
    rule: &ScoringRule,
    time_faults: f64,
    required: f64,
) -> f64 {
    if !(rule.time_faults_under || rule.time_faults_over) {
        return 0.0;
    }
    if time_faults > 0.0 && rule.subtract_time_faults {
        let still_met = score(scoring, rule, time_faults).is_some_and(|score| required <= score);
        if still_met {
            return 0.0;
        }
    }
    time_faults
}

fn bonus(scoring: &RunScoring, rule: &ScoringRule) -> f64 {
    if rule.bonus_title_points {
        scoring.bonus_title_points
    } else {
        0.0
    }
}

fn title_points(scoring: &RunScoring, rule: &ScoringRule, time_faults: f64) -> (f64, bool) {
    match lookup_faults(scoring, rule, time_faults) {
        Some((faults, clean)) => {
            let bonus = if rule.scoring_type() == ScoringType::ByPass {
                0.0
            } else {
                bonus(scoring, rule)
            };
            (rule.title_points_for(faults) + bonus, clean)
        }
        None => (0.0, false),
    }
}

fn lifetime_points(
    scoring: &RunScoring,
    rule: &ScoringRule,
    time_faults: f64,
    speed_points: Option<i32>,
) -> f64 {
    match lookup_faults(scoring, rule, time_faults) {
        Some((faults, _)) => rule.lifetime_points_for(faults, speed_points) + bonus(scoring, rule),
        None => 0.0,
    }
}

fn speed_points(run: &Run, rule: &ScoringRule) -> i32 {
    let time = run.scoring.time;
    let sct = run.scoring.sct;
    if time <= 0.0 || sct <= 0.0 {
        return 0;
    }
    let mut points = ((sct - time).trunc() as i32).max(0);
    if run.place > 0 {
        if let Some(multiplier) = rule
            .place_multiplier(run.place)
            .or_else(|| rule.place_multiplier(0))
        {
            points = (f64::from(points) * multiplier).trunc() as i32;
        }
    }
    points
}
