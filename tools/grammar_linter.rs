/// Grammar Linter — validates a story data directory.
///
/// Usage: grammar_linter <data_dir> [--start <SYMBOL>]

use std::collections::BTreeSet;
use std::path::Path;
use std::process;

use tracing_subscriber::EnvFilter;
use wordweaver::core::grammar::TemplateSegment;
use wordweaver::core::story_data::StoryData;
use wordweaver::schema::emotion::Emotion;
use wordweaver::schema::part_of_speech::PartOfSpeech;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: grammar_linter <data_dir> [--start <SYMBOL>]");
        process::exit(0);
    }

    let data_dir = &args[1];
    let mut start = "SENTENCE".to_string();

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--start" && i + 1 < args.len() {
            i += 1;
            start = args[i].clone();
        }
        i += 1;
    }

    let data_path = Path::new(data_dir);
    if !data_path.is_dir() {
        eprintln!("ERROR: Path '{}' is not a directory", data_dir);
        process::exit(1);
    }

    let data = match StoryData::load_from_dir(data_path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("ERROR: Failed to load story data: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded {} grammar rules, {} lexicon words, {} moral weights",
        data.grammar.rules.len(),
        data.lexicon.len(),
        data.moral_weights.len()
    );

    let (errors, warnings) = lint_data(&data, &start);

    println!("\n=== Grammar Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_data(data: &StoryData, start: &str) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let grammar = &data.grammar;

    if let Err(e) = grammar.validate(start) {
        errors.push(format!("Grammar does not validate from '{}': {}", start, e));
    }

    let reachable = grammar.reachable(start).unwrap_or_default();
    let mut categories: BTreeSet<&'static str> = BTreeSet::new();

    let mut names: Vec<&String> = grammar.rules.keys().collect();
    names.sort();

    for name in names {
        let rule = &grammar.rules[name];
        let uses_category = rule.alternatives.iter().any(|alt| {
            alt.segments
                .iter()
                .any(|s| matches!(s, TemplateSegment::Category(_)))
        });

        // Low variety warning; single-placeholder wrappers get their variety
        // from the lexicon.
        if rule.alternatives.len() < 2 && !uses_category {
            warnings.push(format!(
                "Rule '{}' has only {} alternative (minimum 2 recommended)",
                name,
                rule.alternatives.len()
            ));
        }

        if !reachable.is_empty() && !reachable.contains(name.as_str()) {
            warnings.push(format!("Rule '{}' is not reachable from '{}'", name, start));
        }

        for alt in &rule.alternatives {
            for segment in &alt.segments {
                match segment {
                    TemplateSegment::RuleRef(ref_name) => {
                        if !grammar.rules.contains_key(ref_name.as_str()) {
                            errors.push(format!(
                                "Rule '{}' references non-existent rule '{}'",
                                name, ref_name
                            ));
                        }
                    }
                    TemplateSegment::Category(pos) => {
                        categories.insert(pos.name());
                    }
                    TemplateSegment::Literal(word) => {
                        if data.lexicon.contains_word(word) {
                            warnings.push(format!(
                                "Rule '{}' has terminal '{}' which is also a lexicon word",
                                name, word
                            ));
                        }
                    }
                    TemplateSegment::EntityRef(_) => {}
                }
            }
        }
    }

    // Every placeholder should resolve without the random-bucket fallback
    // for the built-in emotions.
    for category in &categories {
        let Some(pos) = PartOfSpeech::from_name(category) else {
            continue;
        };
        for emotion in Emotion::ALL.iter() {
            if !data.lexicon.has_bucket(pos, emotion.label()) {
                warnings.push(format!(
                    "No {} words for emotion '{}' (generation will fall back to a random bucket)",
                    category, emotion
                ));
            }
        }
    }

    for pos in PartOfSpeech::ALL {
        for emotion in data.lexicon.emotions(pos) {
            for word in data.lexicon.words(pos, emotion).unwrap_or(&[]) {
                if !data.moral_weights.contains(word) {
                    warnings.push(format!(
                        "Lexicon word '{}' ({}/{}) has no moral weight",
                        word,
                        pos.name(),
                        emotion
                    ));
                }
            }
        }
    }

    let mut weighted: Vec<&str> = data.moral_weights.words().collect();
    weighted.sort_unstable();
    for word in weighted {
        let weight = data.moral_weights.weight(word);
        if !(-1.0..=1.0).contains(&weight) {
            warnings.push(format!(
                "Moral weight for '{}' is {} (expected within [-1, 1])",
                word, weight
            ));
        }
    }

    for emotion in Emotion::ALL.iter() {
        if !data.plot_twists.twists.contains_key(emotion.label()) {
            warnings.push(format!(
                "No plot twist for emotion '{}' (fallback will be used)",
                emotion
            ));
        }
    }

    (errors, warnings)
}
