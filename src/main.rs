fn main() {
    use movie_graph_explorer::cli::parse;
    let cli = parse();
    movie_graph_explorer::app::init_tracing(cli.verbose, cli.quiet);
    let code = movie_graph_explorer::app::run_cli(cli);
    if code != 0 {
        std::process::exit(code);
    }
}
