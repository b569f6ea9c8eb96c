mod support;

mod repair_loop;
mod run_wiring;
