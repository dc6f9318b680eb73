use nocturne::uci;

fn main() {
    uci::run();
}
