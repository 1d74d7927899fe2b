use optable::{
    for_type, generate_help, heading, hidden, parse_args, parse_reader, run, scan, scan_and_run,
    value, Collector, Error, Opt, Outcome, Table, TableConfig, TerminalSize, ValuePolicy,
};
use std::cell::{Cell, RefCell};
use std::io::Cursor;
use std::ops::ControlFlow;
use std::rc::Rc;

fn help_or_continue(jobs: &optable::Jobs<'_>) -> ControlFlow<()> {
    if jobs.count("help") > 0 {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}

fn counting_table(count: &Rc<RefCell<i32>>, calls: &Rc<Cell<usize>>) -> Table {
    let calls = Rc::clone(calls);
    let target = Rc::clone(count);
    Table::from(vec![
        Opt::new("help", 'h', "Show help."),
        Opt::new("count", 'c', "N").with_handler(for_type(
            ValuePolicy::Required,
            move |v: Option<i32>| {
                calls.set(calls.get() + 1);
                if let Some(v) = v {
                    *target.borrow_mut() = v;
                }
            },
        )),
    ])
}

#[test]
fn test_count_option_runs_int_handler() {
    let count = Rc::new(RefCell::new(0));
    let calls = Rc::new(Cell::new(0));
    let table = counting_table(&count, &calls);

    let args = parse_args(["prog", "--count=5"]).unwrap();
    let jobs = scan(&args, &table).unwrap();
    assert_eq!(jobs.len(), 1);

    run(&jobs).unwrap();
    assert_eq!(*count.borrow(), 5);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_short_count_without_value_fails_at_run() {
    let count = Rc::new(RefCell::new(0));
    let calls = Rc::new(Cell::new(0));
    let table = counting_table(&count, &calls);

    let args = parse_args(["prog", "-c"]).unwrap();
    let jobs = scan(&args, &table).unwrap();
    let err = run(&jobs).unwrap_err();
    assert!(matches!(err, Error::MissingRequiredValue { .. }));
    assert_eq!(
        err.to_string(),
        "option \"--count\" requires a value, but none was given"
    );
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_help_vetoes_all_handlers() {
    let count = Rc::new(RefCell::new(0));
    let calls = Rc::new(Cell::new(0));
    let table = counting_table(&count, &calls);

    // The bad value would fail at run time, but the veto comes first
    let args = parse_args(["prog", "--count=5", "-c=oops", "--help"]).unwrap();
    let outcome = scan_and_run(&args, &table, help_or_continue).unwrap();
    assert_eq!(outcome, Outcome::Vetoed);
    assert_eq!(calls.get(), 0);
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn test_without_help_runs_in_order() {
    let count = Rc::new(RefCell::new(0));
    let calls = Rc::new(Cell::new(0));
    let table = counting_table(&count, &calls);

    let args = parse_args(["prog", "-c=1", "--count=2", "-c=3"]).unwrap();
    let outcome = scan_and_run(&args, &table, help_or_continue).unwrap();
    assert_eq!(outcome, Outcome::Ran);
    assert_eq!(calls.get(), 3);
    assert_eq!(*count.borrow(), 3);
}

#[test]
fn test_unrecognized_option_message() {
    let count = Rc::new(RefCell::new(0));
    let calls = Rc::new(Cell::new(0));
    let table = counting_table(&count, &calls);

    let args = parse_args(["prog", "--count=1", "--verbose"]).unwrap();
    let err = scan_and_run(&args, &table, help_or_continue).unwrap_err();
    assert_eq!(err.to_string(), "unrecognized option: --verbose");
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_positional_catch_all() {
    let files = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&files);
    let level = Rc::new(RefCell::new(0u8));
    let table = Table::from(vec![
        heading("Options:"),
        Opt::new("level", 'l', "Level").with_handler(value(&level)),
        hidden(Opt::new("", '0', "positional")).with_handler(for_type(
            ValuePolicy::Optional,
            move |v: Option<String>| sink.borrow_mut().extend(v),
        )),
    ]);

    let args = parse_args(["prog", "a.txt", "-l=2", "b.txt"]).unwrap();
    scan_and_run(&args, &table, |_| ControlFlow::Continue(())).unwrap();
    assert_eq!(*files.borrow(), vec!["a.txt", "b.txt"]);
    assert_eq!(*level.borrow(), 2);

    let help = generate_help(&table, TerminalSize::new(80, 24)).unwrap();
    assert!(help.contains("--level, -l"));
    assert!(!help.contains("positional"));
}

#[test]
fn test_stream_source_with_declared_table() {
    let config = TableConfig::from_json(
        r#"{"options":[
            {"long":"help","short":"h","help":"Show help."},
            {"long":"count","short":"c","value":"required","type":"int"},
            {"long":"name","value":"optional"}
        ]}"#,
    )
    .unwrap();
    config.validate().unwrap();
    let collector = Collector::new();
    let table = config.build(&collector);

    let args = parse_reader(Cursor::new("count 3\nname  some body\nc 4\n")).unwrap();
    let outcome = scan_and_run(&args, &table, help_or_continue).unwrap();
    assert_eq!(outcome, Outcome::Ran);
    assert_eq!(
        collector.to_json(),
        serde_json::json!({"count": [3, 4], "name": ["some body"]})
    );
}

#[test]
fn test_help_too_narrow() {
    let table = Table::from(vec![Opt::new("help", 'h', "Show help.")]);
    let err = generate_help(&table, TerminalSize::new(10, 24)).unwrap_err();
    assert!(matches!(err, Error::DisplayTooNarrow));
}
