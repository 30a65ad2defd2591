use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    insight_sim::demo_apps::run_research_demo(std::env::args().skip(1))
}
