use withcaller::{
    CALLER_INFO_PROPERTY, CALLER_PROPERTY, CallerEnricher, CallerProperties, CratePrefixFilter, Enrich, FixedStack,
    Level, LogEvent, Parameter, Property, StackFrameInfo, StopReason, UNKNOWN_METHOD, Value,
};

fn logging_frames() -> Vec<StackFrameInfo> {
    vec![
        StackFrameInfo::from_symbol("backtrace::backtrace::trace"),
        StackFrameInfo::from_symbol("withcaller::stack::ThreadStack::capture"),
        StackFrameInfo::from_symbol(
            "<tracing_subscriber::layer::layered::Layered<L, S> as tracing_core::subscriber::Subscriber>::event",
        ),
        StackFrameInfo::from_symbol("tracing_core::event::Event::dispatch"),
    ]
}

fn app_stack() -> FixedStack {
    let mut frames = logging_frames();
    frames.push(
        StackFrameInfo::new(Some("my_app::handlers"), "Handler", "enrich_with_caller")
            .with_parameters(vec![Parameter::new("bool", "fileInfo")])
            .with_file("src/handlers.rs", Some(95), Some(13)),
    );
    frames.push(StackFrameInfo::from_symbol("std::rt::lang_start::{{closure}}"));
    frames.push(
        StackFrameInfo::new(Some("my_app"), "App", "run").with_file("src/main.rs", Some(12), Some(5)),
    );
    frames.push(StackFrameInfo::new(None, "my_app", "main"));

    FixedStack::new(frames)
}

fn event() -> LogEvent {
    LogEvent::new(Level::INFO, "my_app", "hello")
}

fn caller(event: &LogEvent) -> &str {
    event
        .property(CALLER_PROPERTY)
        .and_then(Value::as_str)
        .expect("caller property missing")
}

#[test]
fn default_config_renders_first_app_frame() {
    let enricher = CallerEnricher::new().inspector(app_stack());
    let mut event = event();

    enricher.enrich(&mut event);

    assert_eq!(
        caller(&event),
        "my_app::handlers::Handler::enrich_with_caller(bool)"
    );
}

#[test]
fn file_info_appends_path_and_line() {
    let enricher = CallerEnricher::with_file_info(true).inspector(app_stack());
    let mut event = event();

    enricher.enrich(&mut event);

    assert_eq!(
        caller(&event),
        "my_app::handlers::Handler::enrich_with_caller(bool) src/handlers.rs:95"
    );
}

#[test]
fn file_info_without_path_renders_no_suffix() {
    let stack = FixedStack::new(vec![StackFrameInfo::new(Some("my_app"), "Quiet", "work")]);
    let enricher = CallerEnricher::with_file_info(true).inspector(stack);
    let mut event = event();

    enricher.enrich(&mut event);

    assert_eq!(caller(&event), "my_app::Quiet::work()");
    let info = event.property(CALLER_INFO_PROPERTY).unwrap().as_structure().unwrap();
    assert!(!info.contains("File"));
}

#[test]
fn max_depth_joins_qualifying_frames() {
    let enricher = CallerEnricher::with_depth(false, 2).inspector(app_stack());
    let mut event = event();

    enricher.enrich(&mut event);

    assert_eq!(
        caller(&event),
        "my_app::handlers::Handler::enrich_with_caller(bool) at my_app::App::run()"
    );
}

#[test]
fn max_depth_beyond_stack_yields_fewer_frames() {
    let enricher = CallerEnricher::with_depth(true, 10).inspector(app_stack());

    let result = enricher.resolve();

    assert_eq!(result.walk.stop, StopReason::StackExhausted);
    assert_eq!(result.walk.frames.len(), 3);
    assert_eq!(
        result.flat,
        "my_app::handlers::Handler::enrich_with_caller(bool) src/handlers.rs:95 at my_app::App::run() src/main.rs:12 at my_app::main()"
    );
}

#[test]
fn structured_describes_first_frame() {
    let enricher = CallerEnricher::with_depth(true, 3).inspector(app_stack());
    let mut event = event();

    enricher.enrich(&mut event);

    let info = event
        .property(CALLER_INFO_PROPERTY)
        .and_then(Value::as_structure)
        .expect("caller info missing");
    assert_eq!(info.get("Class").and_then(Value::as_str), Some("Handler"));
    assert_eq!(
        info.get("Namespace").and_then(Value::as_str),
        Some("my_app::handlers")
    );

    let method = info.get("Method").and_then(Value::as_structure).unwrap();
    assert_eq!(
        method.get("Name").and_then(Value::as_str),
        Some("enrich_with_caller")
    );
    let parameters = method.get("Parameters").and_then(Value::as_sequence).unwrap();
    assert_eq!(parameters.len(), 1);
    let parameter = parameters[0].as_structure().unwrap();
    assert_eq!(parameter.len(), 2);
    assert_eq!(parameter.get("Type").and_then(Value::as_str), Some("bool"));
    assert_eq!(parameter.get("Name").and_then(Value::as_str), Some("fileInfo"));

    let file = info.get("File").and_then(Value::as_structure).unwrap();
    assert_eq!(file.get("Path").and_then(Value::as_str), Some("src/handlers.rs"));
    assert_eq!(file.get("Line").and_then(Value::as_u64), Some(95));
    assert_eq!(file.get("Column").and_then(Value::as_u64), Some(13));

    // The flat rendering starts with the same frame.
    assert!(caller(&event).starts_with("my_app::handlers::Handler::enrich_with_caller(bool)"));
}

#[test]
fn structured_has_no_file_without_file_info() {
    let enricher = CallerEnricher::new().inspector(app_stack());
    let mut event = event();

    enricher.enrich(&mut event);

    let info = event
        .property(CALLER_INFO_PROPERTY)
        .and_then(Value::as_structure)
        .unwrap();
    assert!(!info.contains("File"));
}

#[test]
fn zero_parameter_method() {
    let stack = FixedStack::new(vec![StackFrameInfo::from_symbol(
        "my_app::service::Service::method_name",
    )]);
    let enricher = CallerEnricher::new().inspector(stack);
    let mut event = event();

    enricher.enrich(&mut event);

    assert_eq!(caller(&event), "my_app::service::Service::method_name()");
    let info = event.property(CALLER_INFO_PROPERTY).unwrap().to_string();
    assert_eq!(
        info,
        r#"{ Class: "Service", Namespace: "my_app::service", Method: { Name: "method_name", Parameters: [] } }"#
    );
}

#[test]
fn skip_beyond_stack_is_unknown() {
    let enricher = CallerEnricher::new().skip_frames(50).inspector(app_stack());
    let mut event = event();

    enricher.enrich(&mut event);

    assert_eq!(caller(&event), UNKNOWN_METHOD);
    let info = event.property(CALLER_INFO_PROPERTY).unwrap();
    assert_eq!(info.as_structure().map(|s| s.is_empty()), Some(true));
}

#[test]
fn only_infrastructure_frames_is_unknown() {
    let enricher = CallerEnricher::new().inspector(FixedStack::new(logging_frames()));

    let result = enricher.resolve();

    assert_eq!(result.flat, UNKNOWN_METHOD);
    assert_eq!(result.walk.stop, StopReason::StackExhausted);
}

#[test]
fn search_limit_is_unknown() {
    let enricher = CallerEnricher::new()
        .max_frame_search(3)
        .inspector(app_stack());

    let result = enricher.resolve();

    assert_eq!(result.flat, UNKNOWN_METHOD);
    assert_eq!(result.walk.stop, StopReason::SearchLimit);
}

#[test]
fn existing_properties_are_kept() {
    let enricher = CallerEnricher::new().inspector(app_stack());
    let mut event = event();
    event.add_property_if_absent(Property::new(CALLER_PROPERTY, Value::str("set by hand")));

    enricher.enrich(&mut event);

    assert_eq!(caller(&event), "set by hand");
    // The structured property was still absent, so it is added.
    assert!(event.has_property(CALLER_INFO_PROPERTY));
}

#[test]
fn enriching_twice_keeps_first_values() {
    let enricher = CallerEnricher::new().inspector(app_stack());
    let other = CallerEnricher::new()
        .skip_frames(50)
        .inspector(app_stack());
    let mut event = event();

    enricher.enrich(&mut event);
    let first = event.properties().clone();
    other.enrich(&mut event);

    assert_eq!(event.properties(), &first);
}

#[test]
fn string_only_variant() {
    let enricher = CallerEnricher::new()
        .properties(CallerProperties::Flat)
        .inspector(app_stack());
    let mut event = event();

    enricher.enrich(&mut event);

    assert!(event.has_property(CALLER_PROPERTY));
    assert!(!event.has_property(CALLER_INFO_PROPERTY));
}

#[test]
fn structure_only_variant() {
    let enricher = CallerEnricher::new()
        .properties(CallerProperties::Structured)
        .inspector(app_stack());
    let mut event = event();

    enricher.enrich(&mut event);

    assert!(!event.has_property(CALLER_PROPERTY));
    let info = event
        .property(CALLER_INFO_PROPERTY)
        .and_then(Value::as_structure)
        .unwrap();
    assert_eq!(info.get("Class").and_then(Value::as_str), Some("Handler"));
}

#[test]
fn structure_only_keeps_existing_info() {
    let enricher = CallerEnricher::new()
        .properties(CallerProperties::Structured)
        .inspector(app_stack());
    let mut event = event();
    event.add_property_if_absent(Property::new(CALLER_INFO_PROPERTY, Value::str("by hand")));

    enricher.enrich(&mut event);

    assert!(!event.has_property(CALLER_PROPERTY));
    assert_eq!(
        event.property(CALLER_INFO_PROPERTY).and_then(Value::as_str),
        Some("by hand")
    );
}

#[test]
fn custom_filter_replaces_default() {
    let skip_handlers = |frame: &StackFrameInfo| {
        frame.type_name == "Handler" || CratePrefixFilter::default().crates().iter().any(|c| c == frame.crate_name())
    };
    let enricher = CallerEnricher::new()
        .filter(skip_handlers)
        .inspector(app_stack());

    let result = enricher.resolve();

    assert_eq!(result.flat, "my_app::App::run()");
}

#[test]
fn extended_crate_filter() {
    let filter = CratePrefixFilter::default().with_crate("my_app");
    let enricher = CallerEnricher::new().filter(filter).inspector(app_stack());

    let result = enricher.resolve();

    assert_eq!(result.flat, UNKNOWN_METHOD);
}
