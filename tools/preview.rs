/// Preview — interactive generation shell for trying out story data.
///
/// Usage: preview [--data <dir>] [--config <file>] [--seed <n>] [--emotion <e>]
///                [--protagonist <name>] [--setting <place>]
///
/// Commands:
///   story [n]              — generate a story of n sentences
///   score                  — moral score of the last story
///   tone <emotion>         — rewrite the last story into another tone
///   twist                  — append the plot twist for the current emotion
///   emotion <e>            — switch emotion (restarts the session)
///   seed <n>               — set RNG seed (restarts the session)
///   entity <role> <value>  — bind a role for `{role}` placeholders
///   bulk <n>               — generate n stories with variety stats
///   help                   — list commands
///   quit                   — exit

use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use wordweaver::schema::emotion::Emotion;
use wordweaver::{NarrativeEngine, PipelineError};

/// Everything needed to rebuild the engine after a seed or emotion change.
struct Session {
    data_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    emotion: String,
    protagonist: String,
    setting: String,
    seed: u64,
    extra_entities: Vec<(String, String)>,
}

impl Session {
    fn build(&self) -> Result<NarrativeEngine, PipelineError> {
        let mut builder = NarrativeEngine::builder()
            .emotion(&self.emotion)
            .protagonist(&self.protagonist)
            .setting(&self.setting)
            .seed(self.seed);
        if let Some(ref dir) = self.data_dir {
            builder = builder.data_dir(dir);
        }
        if let Some(ref path) = self.config_path {
            builder = builder.config_file(path);
        }
        let mut engine = builder.build()?;
        for (role, value) in &self.extra_entities {
            engine.add_entity(role, value);
        }
        Ok(engine)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut session = Session {
        data_dir: None,
        config_path: None,
        emotion: "happy".to_string(),
        protagonist: "Mira".to_string(),
        setting: "a quiet village".to_string(),
        seed: 42,
        extra_entities: Vec::new(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return;
            }
            "--data" if i + 1 < args.len() => {
                i += 1;
                session.data_dir = Some(PathBuf::from(&args[i]));
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                session.config_path = Some(PathBuf::from(&args[i]));
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                session.seed = args[i].parse().unwrap_or(42);
            }
            "--emotion" if i + 1 < args.len() => {
                i += 1;
                session.emotion = args[i].clone();
            }
            "--protagonist" if i + 1 < args.len() => {
                i += 1;
                session.protagonist = args[i].clone();
            }
            "--setting" if i + 1 < args.len() => {
                i += 1;
                session.setting = args[i].clone();
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut engine = match session.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Emotion: {}  Protagonist: {}  Setting: {}",
        engine.emotion(),
        session.protagonist,
        session.setting
    );
    println!("Seed: {}", session.seed);
    println!("Type 'help' for commands.\n");

    let mut last_story = String::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "story" => {
                let result = match parts.get(1) {
                    Some(n) => match n.parse::<usize>() {
                        Ok(n) => engine.generate_story(n),
                        Err(_) => {
                            println!("Usage: story [n]");
                            continue;
                        }
                    },
                    None => engine.generate_default_story(),
                };
                match result {
                    Ok(story) => {
                        println!("\n--- Story ---");
                        println!("{}", story);
                        println!("--- End ---\n");
                        last_story = story;
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "score" => {
                if last_story.is_empty() {
                    println!("No story yet. Use 'story' first.");
                    continue;
                }
                println!("Moral score: {:.2}", engine.calculate_moral_score(&last_story));
            }
            "tone" => {
                if parts.len() < 2 {
                    println!("Usage: tone <emotion>");
                    continue;
                }
                if last_story.is_empty() {
                    println!("No story yet. Use 'story' first.");
                    continue;
                }
                let rewritten = engine.rewrite_tone(&last_story, parts[1]);
                println!("\n--- Rewritten ({}) ---", parts[1]);
                println!("{}", rewritten);
                println!("--- End ---\n");
                println!("Moral score: {:.2}", engine.calculate_moral_score(&rewritten));
                last_story = rewritten;
            }
            "twist" => {
                let twist = engine.generate_plot_twist();
                println!("{}", twist);
                if !last_story.is_empty() {
                    last_story.push(' ');
                }
                last_story.push_str(&twist);
            }
            "emotion" => {
                if parts.len() < 2 {
                    println!("Usage: emotion <e>");
                    continue;
                }
                let previous = std::mem::replace(&mut session.emotion, parts[1].to_string());
                match session.build() {
                    Ok(new_engine) => {
                        engine = new_engine;
                        last_story.clear();
                        println!("Emotion set to {}", engine.emotion());
                    }
                    Err(e) => {
                        session.emotion = previous;
                        println!("ERROR: {}", e);
                    }
                }
            }
            "seed" => {
                let Some(seed) = parts.get(1).and_then(|s| s.parse::<u64>().ok()) else {
                    println!("Usage: seed <n>");
                    continue;
                };
                session.seed = seed;
                match session.build() {
                    Ok(new_engine) => {
                        engine = new_engine;
                        last_story.clear();
                        println!("Seed set to {}", seed);
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "entity" => {
                if parts.len() < 3 {
                    println!("Usage: entity <role> <value>");
                    continue;
                }
                let role = parts[1].to_string();
                let value = parts[2..].join(" ");
                engine.add_entity(&role, &value);
                session.extra_entities.retain(|(r, _)| *r != role);
                session.extra_entities.push((role.clone(), value.clone()));
                println!("{{{}}} = {}", role, value);
            }
            "bulk" => {
                let n: usize = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(10);
                run_bulk(&mut engine, n);
            }
            _ => {
                println!("Unknown command: '{}'. Type 'help' for commands.", cmd);
            }
        }
    }
}

/// Generate `n` stories and report how varied the sentences were.
fn run_bulk(engine: &mut NarrativeEngine, n: usize) {
    let length = engine.config().story_length;
    let mut sentences: Vec<String> = Vec::new();
    let mut total_score = 0.0;
    let mut generated = 0usize;

    for _ in 0..n {
        match engine.generate_story(length) {
            Ok(story) => {
                total_score += engine.calculate_moral_score(&story);
                generated += 1;
                sentences.extend(
                    story
                        .split(". ")
                        .skip(1)
                        .map(|s| s.trim_end_matches('.').to_string()),
                );
            }
            Err(e) => {
                println!("ERROR: {}", e);
                return;
            }
        }
    }

    if generated == 0 {
        println!("Nothing generated.");
        return;
    }

    let distinct: HashSet<&str> = sentences.iter().map(String::as_str).collect();
    println!("\n=== Bulk Generation ({} stories) ===", generated);
    println!("Sentences: {} ({} distinct)", sentences.len(), distinct.len());
    println!("Mean moral score: {:.2}", total_score / generated as f64);
    println!("Nouns used so far: {}", engine.used_nouns().len());
    println!();
}

fn print_usage() {
    println!("Preview — interactive generation shell for trying out story data.");
    println!();
    println!("Usage: preview [--data <dir>] [--config <file>] [--seed <n>] [--emotion <e>]");
    println!("               [--protagonist <name>] [--setting <place>]");
    println!();
    println!("  --data <dir>          Story data directory (default: built-in tables)");
    println!("  --config <file>       Engine config in RON");
    println!("  --seed <n>            Initial RNG seed (default: 42)");
    println!("  --emotion <e>         Story emotion (default: happy)");
    println!("  --protagonist <name>  Protagonist name (default: Mira)");
    println!("  --setting <place>     Setting (default: a quiet village)");
}

fn print_help() {
    println!("Commands:");
    println!("  story [n]              Generate a story of n sentences");
    println!("  score                  Moral score of the last story");
    println!("  tone <emotion>         Rewrite the last story into another tone");
    println!("  twist                  Append the plot twist for the current emotion");
    println!("  emotion <e>            Switch emotion (restarts the session)");
    println!("  seed <n>               Set RNG seed (restarts the session)");
    println!("  entity <role> <value>  Bind a role for {{role}} placeholders");
    println!("  bulk <n>               Generate n stories with variety statistics");
    println!("  help                   Show this help");
    println!("  quit                   Exit");
    println!();
    let labels: Vec<String> = Emotion::ALL.iter().map(|e| e.label().to_string()).collect();
    println!("Emotions: {}", labels.join(", "));
}
