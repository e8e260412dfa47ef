use clap::Parser;
use integracar::{cli, config, error, export, report, session};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use integracar_common::Dimension;
use session::{resolve_now, Session};

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    let config = Config::load()?;
    let reference = cli.reference.as_deref();

    match cli.command {
        Commands::Columns { input } => {
            let input = config.input_path(input)?;
            let session = Session::open(&input, &config, reference)?;
            println!("📋 {}\n", input.display());
            print!("{}", report::render_columns(session.state.roles(), session.state.headers()));
            println!("\n✔ {} registros", session.state.len());
        }

        Commands::Summary { input, filter, top, json } => {
            let input = config.input_path(input)?;
            let now = resolve_now(cli.today.as_deref())?;
            let mut session = Session::open(&input, &config, reference)?;
            let view = session.refresh(&filter.to_filter(), now);
            let top = top.unwrap_or(config.engine.top_n);

            if json {
                let body = report::SummaryReport::new(&view, top);
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("📊 IntegraCAR - resumo ({})\n", now.format("%d/%m/%Y"));
                print!("{}", report::render_summary(&view, top));
            }
        }

        Commands::Pivot { input, filter, dimension, top, by_class } => {
            let input = config.input_path(input)?;
            let now = resolve_now(cli.today.as_deref())?;
            let mut session = Session::open(&input, &config, reference)?;
            let view = session.refresh(&filter.to_filter(), now);
            let top = top.unwrap_or(config.engine.top_n);

            let pivot = if by_class {
                view.class_pivot(dimension, top)
            } else {
                view.status_pivot(dimension, &session.engine.reference().status_labels, top)
            };
            print!("{}", report::render_pivot(&pivot, dimension.label()));
        }

        Commands::Pendencias { input, filter, json } => {
            let input = config.input_path(input)?;
            let now = resolve_now(cli.today.as_deref())?;
            let mut session = Session::open(&input, &config, reference)?;
            let view = session.refresh(&filter.to_filter(), now);

            if json {
                println!("{}", serde_json::to_string_pretty(&view.pendencias)?);
            } else {
                println!(
                    "⏰ Prazo padrão {} dias, janela {} dias\n",
                    config.engine.default_deadline_days, config.engine.critical_window_days
                );
                print!("{}", report::render_pendencias(&view.pendencias));
            }
        }

        Commands::Mapa { input, filter, json } => {
            let input = config.input_path(input)?;
            let now = resolve_now(cli.today.as_deref())?;
            let mut session = Session::open(&input, &config, reference)?;
            let view = session.refresh(&filter.to_filter(), now);
            let map = view.map(session.engine.reference());

            if json {
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else {
                print!("{}", report::render_map(&map));
            }
        }

        Commands::Export { input, filter, format, output, pivot } => {
            println!("📄 IntegraCAR - exportação\n");
            let input = config.input_path(input)?;
            let now = resolve_now(cli.today.as_deref())?;

            println!("[1/3] Lendo {}...", input.display());
            let mut session = Session::open(&input, &config, reference)?;
            println!("✔ {} registros\n", session.state.len());

            println!("[2/3] Normalizando...");
            let view = session.refresh(&filter.to_filter(), now);
            let table = integracar_common::export::export_table(&session.state, &view);
            println!("✔ {} registros no recorte\n", table.len());

            println!("[3/3] Gravando...");
            let pivot = pivot.map(|dimension: Dimension| {
                let table = view.status_pivot(
                    dimension,
                    &session.engine.reference().status_labels,
                    config.engine.top_n,
                );
                (table, dimension.label())
            });
            let path = export::output_path_for_format(output.as_deref(), &input, format);
            let path = export::export_table(&table, pivot.as_ref().map(|(p, l)| (p, *l)), format, &path)?;
            println!("✔ {}", path.display());

            println!("\n✅ Concluído");
        }

        Commands::Config { show, set_default_deadline, set_reference, set_input } => {
            let mut config = config;
            let mut changed = false;

            if let Some(days) = set_default_deadline {
                config.set_default_deadline(days)?;
                println!("✔ Prazo padrão: {} dias", days);
                changed = true;
            }
            if let Some(path) = set_reference {
                println!("✔ Referência: {}", path.display());
                config.reference = Some(path);
                changed = true;
            }
            if let Some(path) = set_input {
                println!("✔ Planilha padrão: {}", path.display());
                config.default_input = Some(path);
                changed = true;
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                let path_text = |p: &Option<std::path::PathBuf>| {
                    p.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(não definido)".into())
                };
                println!("Configuração ({}):", Config::config_path()?.display());
                println!("  Prazo padrão: {} dias", config.engine.default_deadline_days);
                println!("  Janela crítica: {} dias", config.engine.critical_window_days);
                println!("  Rankings: top {}", config.engine.top_n);
                println!("  Referência: {}", path_text(&config.reference));
                println!("  Planilha padrão: {}", path_text(&config.default_input));
            }
        }
    }

    Ok(())
}
