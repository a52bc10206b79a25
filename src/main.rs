fn main() {
    plexus::run_cli();
}
