use agility_points::config::ScoringOptions;
use agility_points::filter::VisibilityFilterState;
use agility_points::runs::{visible_rows, RunColumn, RunComparator};
use agility_points::scoring::domain::Club;
use agility_points::scoring::multiq::definitions_met_on;
use agility_points::scoring::rules::{
    DivisionConfig, EventConfig, LevelConfig, MultiQDefinition, MultiQItem, PlaceValue,
    TitlePoints, VenueConfig,
};
use agility_points::scoring::{
    Configuration, Dog, MultiQTracker, QStatus, Run, RunEvaluator, ScoringResolver, ScoringRule,
    ScoringStyle, Trial,
};
use chrono::NaiveDate;

fn trial_date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).expect("valid date")
}

fn standard_rule() -> ScoringRule {
    let mut rule = ScoringRule::new(ScoringStyle::FaultsThenTime);
    rule.drop_fractions = true;
    rule.title_points = vec![TitlePoints {
        faults: 0.0,
        points: 10.0,
    }];
    rule
}

fn venue() -> VenueConfig {
    let mut jumpers = standard_rule();
    jumpers.speed_points = true;
    jumpers.place_multipliers = vec![PlaceValue {
        place: 0,
        value: 1.0,
    }];
    let item = |event: &str| MultiQItem {
        division: "Open".to_string(),
        level: "Masters".to_string(),
        event: event.to_string(),
    };

    VenueConfig {
        name: "CPE".to_string(),
        url: None,
        lifetime_name: None,
        divisions: vec![DivisionConfig {
            name: "Open".to_string(),
            levels: vec![LevelConfig {
                name: "Masters".to_string(),
                sub_levels: Vec::new(),
            }],
        }],
        events: vec![
            EventConfig {
                name: "Standard".to_string(),
                has_partner: false,
                rules: vec![standard_rule()],
            },
            EventConfig {
                name: "Jumpers".to_string(),
                has_partner: false,
                rules: vec![jumpers],
            },
        ],
        multi_qs: vec![MultiQDefinition {
            name: "Double Q".to_string(),
            short_name: "QQ".to_string(),
            valid_from: None,
            valid_to: None,
            items: vec![item("Standard"), item("Jumpers")],
        }],
    }
}

fn run(day: u32, event: &str, q: QStatus, time: f64, sct: f64) -> Run {
    let mut run = Run::new(trial_date(day), "Open", "Masters", event);
    run.q = q;
    run.scoring.time = time;
    run.scoring.sct = sct;
    run
}

fn trial(runs: Vec<Run>) -> Trial {
    Trial {
        location: "Arena".to_string(),
        notes: String::new(),
        clubs: vec![Club {
            name: "Agile Paws".to_string(),
            venue: "CPE".to_string(),
        }],
        runs,
    }
}

#[test]
fn whole_second_time_faults_add_to_course_faults() {
    let rule = standard_rule();
    let evaluator = RunEvaluator::new(ScoringOptions::default());

    let mut over = run(1, "Standard", QStatus::NotQualified, 35.2, 32.0);
    over.scoring.course_faults = 5.0;
    let evaluated = evaluator.evaluate(&over, Some(&rule));
    assert_eq!(evaluated.time_faults, Some(3.0));
    assert_eq!(evaluated.total_faults, Some(8.0));

    let at_sct = run(1, "Standard", QStatus::Qualified, 32.0, 32.0);
    assert_eq!(evaluator.evaluate(&at_sct, Some(&rule)).time_faults, Some(0.0));

    let just_over = run(1, "Standard", QStatus::Qualified, 32.99, 32.0);
    assert_eq!(
        evaluator.evaluate(&just_over, Some(&rule)).time_faults,
        Some(0.0)
    );
}

#[test]
fn fractional_time_faults_without_drop_fractions() {
    let mut rule = standard_rule();
    rule.drop_fractions = false;
    let evaluator = RunEvaluator::new(ScoringOptions::default());
    let just_over = run(1, "Standard", QStatus::Qualified, 32.99, 32.0);
    let faults = evaluator
        .evaluate(&just_over, Some(&rule))
        .time_faults
        .expect("time faults");
    assert!((faults - 0.99).abs() < 1e-9);
}

#[test]
fn runs_without_a_rule_score_nothing() {
    let config = Configuration {
        venues: vec![venue()],
        other_points: Vec::new(),
    };
    let resolver = ScoringResolver::new(&config);
    let trial = trial(vec![run(1, "Snooker", QStatus::Qualified, 30.0, 40.0)]);
    let rule = resolver.resolve_run(&trial, &trial.runs[0]);
    assert!(rule.is_none());

    let evaluated = RunEvaluator::default().evaluate(&trial.runs[0], rule);
    assert!(evaluated.title_points.is_none());
    assert!(evaluated.speed_points.is_none());
}

#[test]
fn one_double_q_per_trial_day() {
    let venue = venue();
    let trial = trial(vec![
        run(1, "Standard", QStatus::Qualified, 30.0, 40.0),
        run(1, "Standard", QStatus::Qualified, 31.0, 40.0),
        run(1, "Jumpers", QStatus::Qualified, 20.0, 30.0),
        run(2, "Standard", QStatus::Qualified, 30.0, 40.0),
        run(2, "Jumpers", QStatus::NotQualified, 35.0, 30.0),
    ]);

    let met = definitions_met_on(&venue, &trial, trial_date(1), |_| true);
    assert_eq!(met.len(), 1);
    assert!(definitions_met_on(&venue, &trial, trial_date(2), |_| true).is_empty());

    let state = VisibilityFilterState::default();
    let summaries = MultiQTracker::new(state.filter()).accumulate(&venue, &[trial], &[]);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].occurrences.len(), 1);
    assert_eq!(summaries[0].label(), "1 QQ");
}

#[test]
fn missing_values_sort_last_in_both_directions() {
    let config = Configuration {
        venues: vec![venue()],
        other_points: Vec::new(),
    };
    let dog = Dog {
        call_name: "Zip".to_string(),
        registered_name: String::new(),
        registration_numbers: Vec::new(),
        titles: Vec::new(),
        existing_points: Vec::new(),
        trials: vec![trial(vec![
            run(1, "Jumpers", QStatus::NotQualified, 33.0, 30.0),
            run(1, "Jumpers", QStatus::Qualified, 20.0, 30.0),
            run(2, "Jumpers", QStatus::Qualified, 25.0, 30.0),
        ])],
    };
    let state = VisibilityFilterState::default();
    let resolver = ScoringResolver::new(&config);
    let evaluator = RunEvaluator::default();

    let speeds = |descending: bool| -> Vec<Option<i32>> {
        let mut rows = visible_rows(&dog, resolver, &evaluator, state.filter());
        RunComparator::for_column(RunColumn::Speed, descending).sort(&mut rows);
        rows.iter().map(|row| row.evaluated.speed_points).collect()
    };

    assert_eq!(speeds(false), vec![Some(5), Some(10), None]);
    assert_eq!(speeds(true), vec![Some(10), Some(5), None]);
}
