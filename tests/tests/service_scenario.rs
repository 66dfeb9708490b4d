//! Services deployed on servers: the write pipeline end to end.

use pretty_assertions::assert_eq;
use schemata_tests::prelude::*;
use std::thread;
use std::time::Duration;

mod service_lifecycle {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_service_lifecycle() {
        let mut s = Scenario::new("service_lifecycle", engine().unwrap());

        s.create("create_server", "infra.server", props! { "hostname" => "alpha" }, |a| {
            a.accepted().violations(0)
        })
        .unwrap();
        let server = s.id("create_server").unwrap();

        // Unique-safe, but the obligatory name and server are absent
        s.create(
            "service_without_server",
            "infra.service",
            props! { "url" => "https://alpha.example", "port" => 443 },
            |a| {
                a.rejected()
                    .violations(2)
                    .at("name", ViolationKind::ObligatoryMissing)
                    .at("server", ViolationKind::ObligatoryMissing)
                    .without(ViolationKind::UniqueConstraintViolation)
            },
        )
        .unwrap();

        s.create(
            "service_port_out_of_range",
            "infra.service",
            props! { "name" => "api", "url" => "https://alpha.example", "port" => 70000, "server" => server },
            |a| {
                a.rejected()
                    .violations(1)
                    .at("port", ViolationKind::Custom)
                    .message_matches("between 1 and 65535")
            },
        )
        .unwrap();

        s.create(
            "web_service_without_url",
            "infra.service",
            props! { "name" => "api", "type" => "web", "port" => 8080, "server" => server },
            |a| a.rejected().violations(1).at("url", ViolationKind::Custom),
        )
        .unwrap();

        s.create(
            "create_service",
            "infra.service",
            props! { "name" => "api", "url" => "https://alpha.example", "port" => 443, "server" => server },
            |a| a.accepted().warnings(0),
        )
        .unwrap();

        s.create(
            "duplicate_url_and_port",
            "infra.service",
            props! { "name" => "api-2", "url" => "https://alpha.example", "port" => 443, "server" => server },
            |a| {
                a.rejected()
                    .violations(1)
                    .at("url", ViolationKind::UniqueConstraintViolation)
                    .message_matches(r"\(url, port\)")
            },
        )
        .unwrap();

        s.create(
            "same_url_other_port",
            "infra.service",
            props! { "name" => "api-admin", "url" => "https://alpha.example", "port" => 8443, "server" => server },
            |a| a.accepted(),
        )
        .unwrap();

        // A warning is still a reported entry
        s.create(
            "plain_http_warning_rejects",
            "infra.service",
            props! { "name" => "legacy", "url" => "http://alpha.example", "port" => 80, "server" => server },
            |a| a.rejected().violations(1).warnings(1).at("url", ViolationKind::Custom),
        )
        .unwrap();

        assert_eq!(s.engine().instances_of("infra.service").unwrap().len(), 2);
    }

    #[test]
    fn test_url_less_services_share_no_port() {
        let mut s = Scenario::new("url_less_services", engine().unwrap());
        let server = s
            .create("create_server", "infra.server", props! { "hostname" => "alpha" }, |a| a.accepted())
            .unwrap()
            .unwrap();

        s.create(
            "first_without_url",
            "infra.service",
            props! { "name" => "cron", "port" => 80, "server" => server },
            |a| a.accepted(),
        )
        .unwrap();

        // A missing url equals another missing url
        s.create(
            "second_without_url",
            "infra.service",
            props! { "name" => "queue", "port" => 80, "server" => server },
            |a| {
                a.rejected()
                    .violations(1)
                    .at("url", ViolationKind::UniqueConstraintViolation)
            },
        )
        .unwrap();

        s.create(
            "without_url_other_port",
            "infra.service",
            props! { "name" => "queue", "port" => 81, "server" => server },
            |a| a.accepted(),
        )
        .unwrap();

        assert_eq!(s.engine().instances_of("infra.service").unwrap().len(), 2);
    }
}

mod accumulation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_violation_is_reported() {
        let mut s = Scenario::new("accumulation", engine().unwrap());

        s.create(
            "everything_wrong",
            "infra.service",
            props! {
                "url" => "ftp://alpha.example",
                "port" => "eighty",
                "type" => "mail",
                "colour" => "blue",
            },
            |a| {
                a.rejected()
                    .violations(6)
                    .at("name", ViolationKind::ObligatoryMissing)
                    .at("url", ViolationKind::PatternMismatch)
                    .at("port", ViolationKind::TypeMismatch)
                    .at("type", ViolationKind::OptionNotInSet)
                    .at("colour", ViolationKind::UnknownProperty)
                    .at("server", ViolationKind::ObligatoryMissing)
            },
        )
        .unwrap();

        assert!(s.engine().is_empty());
    }

    #[test]
    fn test_option_membership_is_exact() {
        let engine = engine().unwrap();
        let server = engine
            .create("infra.server", props! { "hostname" => "alpha" })
            .unwrap()
            .id()
            .unwrap();

        for code in ["web", "worker", "batch"] {
            let outcome = engine
                .create(
                    "infra.service",
                    props! { "name" => code, "type" => code, "url" => format!("https://{}.example", code), "server" => server },
                )
                .unwrap();
            assert!(outcome.is_accepted(), "{} should be accepted: {:?}", code, outcome);
        }

        for code in ["we", "Web", "webs", ""] {
            let outcome = engine
                .create("infra.service", props! { "name" => "x", "type" => code, "server" => server })
                .unwrap();
            let kinds: Vec<ViolationKind> = outcome.violations().iter().map(|v| v.kind).collect();
            if code.is_empty() {
                // Blank is absence, and the option is not obligatory
                assert!(outcome.is_accepted());
            } else {
                assert_eq!(kinds, vec![ViolationKind::OptionNotInSet]);
            }
        }
    }
}

mod defaults {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_stored() {
        let engine = engine().unwrap();

        let server = engine
            .create("infra.server", props! { "hostname" => "alpha" })
            .unwrap()
            .id()
            .unwrap();
        let service = engine
            .create("infra.service", props! { "name" => "queue", "server" => server })
            .unwrap()
            .id()
            .unwrap();

        assert_eq!(engine.get(server).unwrap().get("cores"), Some(&Value::Int(2)));
        assert_eq!(engine.get(service).unwrap().get("type"), Some(&Value::from("worker")));
    }

    #[test]
    fn test_explicit_value_wins_over_default() {
        let engine = engine().unwrap();

        let outcome = engine
            .create("infra.server", props! { "hostname" => "beta", "cores" => 1024 })
            .unwrap();

        assert_eq!(outcome.violations()[0].kind, ViolationKind::OutOfRange);
        assert_eq!(outcome.violations()[0].path, "cores");
    }
}

mod updates_and_deletes {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_update_revalidates() {
        let mut s = Scenario::new("updates", engine().unwrap());
        let server = s
            .create("create_server", "infra.server", props! { "hostname" => "alpha" }, |a| a.accepted())
            .unwrap()
            .unwrap();
        s.create(
            "create_api",
            "infra.service",
            props! { "name" => "api", "url" => "https://alpha.example", "port" => 443, "server" => server },
            |a| a.accepted(),
        )
        .unwrap();
        s.create(
            "create_admin",
            "infra.service",
            props! { "name" => "admin", "url" => "https://alpha.example", "port" => 8443, "server" => server },
            |a| a.accepted(),
        )
        .unwrap();

        s.update("move_admin_onto_api", "create_admin", props! { "port" => 443 }, |a| {
            a.rejected().at("url", ViolationKind::UniqueConstraintViolation)
        })
        .unwrap();
        s.update("port_out_of_range", "create_api", props! { "port" => 0 }, |a| {
            a.rejected().at("port", ViolationKind::Custom)
        })
        .unwrap();
        s.update("resave_unchanged", "create_api", props! { "port" => 443 }, |a| a.accepted())
            .unwrap();
        s.update("make_web_without_url", "create_api", props! { "type" => "web", "url" => Value::Null }, |a| {
            a.rejected().violations(1).at("url", ViolationKind::Custom)
        })
        .unwrap();
        s.update("drop_server", "create_api", props! { "server" => Value::Null }, |a| {
            a.rejected().at("server", ViolationKind::ObligatoryMissing)
        })
        .unwrap();

        let api = s.engine().get(s.id("create_api").unwrap()).unwrap();
        assert_eq!(api.get("port"), Some(&Value::Int(443)));
        assert_eq!(api.get("server"), Some(&Value::Ref(server)));
    }

    #[test]
    fn test_delete_is_restricted_while_referenced() {
        let engine = engine().unwrap();
        let server = engine
            .create("infra.server", props! { "hostname" => "alpha" })
            .unwrap()
            .id()
            .unwrap();
        let service = engine
            .create("infra.service", props! { "name" => "api", "server" => server })
            .unwrap()
            .id()
            .unwrap();

        let refused = engine.delete(server);
        assert!(matches!(
            refused,
            Err(TransactionError::Graph(schemata_core::GraphError::ReferencedBy { ref referrers, .. }))
                if referrers == &vec![service]
        ));

        engine.delete(service).unwrap();
        let removed = engine.delete(server).unwrap();
        assert_eq!(removed.get("hostname"), Some(&Value::from("alpha")));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let mut s = Scenario::new("dangling", engine().unwrap());

        s.create(
            "service_on_missing_server",
            "infra.service",
            props! { "name" => "api", "server" => InstanceId::new(999) },
            |a| a.rejected().violations(1).at("server", ViolationKind::DanglingReference),
        )
        .unwrap();
    }

    #[test]
    fn test_unknown_definition_is_an_error() {
        let mut s = Scenario::new("unknown", engine().unwrap());

        s.create("create_router", "infra.router", props! { "name" => "edge" }, |a| {
            a.error("infra.router")
        })
        .unwrap();
    }
}

mod hooks {
    use super::*;
    use pretty_assertions::assert_eq;

    fn slow_engine(timeout_ms: Option<u64>) -> WriteEngine {
        let registry = registry_with_hook(|_: &Instance, _: &[Violation]| -> Vec<Violation> {
            thread::sleep(Duration::from_millis(300));
            Vec::new()
        })
        .unwrap();
        let config = EngineConfig {
            hook_timeout_ms: timeout_ms,
            ..EngineConfig::default()
        };
        WriteEngine::new(registry, LocaleCatalog::new(), &config).unwrap()
    }

    fn server(engine: &WriteEngine) -> InstanceId {
        engine
            .create("infra.server", props! { "hostname" => "alpha" })
            .unwrap()
            .id()
            .unwrap()
    }

    #[test]
    fn test_hook_timeout_rejects() {
        let engine = slow_engine(Some(20));
        let server = server(&engine);

        let outcome = engine
            .create("infra.service", props! { "name" => "api", "server" => server })
            .unwrap();

        assert!(outcome.is_rejected());
        assert_eq!(outcome.violations().len(), 1);
        assert_eq!(outcome.violations()[0].kind, ViolationKind::HookTimeout);
        assert_eq!(outcome.violations()[0].path, "");
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_no_timeout_waits_for_hook() {
        let engine = slow_engine(None);
        let server = server(&engine);

        let outcome = engine
            .create("infra.service", props! { "name" => "api", "server" => server })
            .unwrap();

        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_panicking_hook_rejects() {
        let registry = registry_with_hook(|instance: &Instance, _: &[Violation]| -> Vec<Violation> {
            if instance.get("name") == Some(&Value::from("boom")) {
                panic!("hook exploded");
            }
            Vec::new()
        })
        .unwrap();
        let engine = WriteEngine::from_registry(registry).unwrap();
        let server = server(&engine);

        let outcome = engine
            .create("infra.service", props! { "name" => "boom", "server" => server })
            .unwrap();

        assert_eq!(outcome.violations()[0].kind, ViolationKind::HookFailed);
        assert!(outcome.violations()[0].message.contains("hook exploded"));
        assert!(engine
            .create("infra.service", props! { "name" => "calm", "server" => server })
            .unwrap()
            .is_accepted());
    }

    #[test]
    fn test_hook_sees_builtin_violations() {
        let registry = registry_with_hook(|_: &Instance, prior: &[Violation]| -> Vec<Violation> {
            if prior.iter().any(|v| v.path == "server") {
                vec![Violation::warning("", "Service will not be scheduled")]
            } else {
                Vec::new()
            }
        })
        .unwrap();
        let engine = WriteEngine::from_registry(registry).unwrap();

        let outcome = engine.create("infra.service", props! { "name" => "api" }).unwrap();

        let kinds: Vec<(ViolationKind, Severity)> =
            outcome.violations().iter().map(|v| (v.kind, v.severity)).collect();
        assert_eq!(
            kinds,
            vec![
                (ViolationKind::ObligatoryMissing, Severity::Error),
                (ViolationKind::Custom, Severity::Warning),
            ]
        );
    }
}

mod dry_run {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_reports_without_committing() {
        let engine = engine().unwrap();

        let violations = engine
            .validate("infra.service", props! { "name" => "api", "port" => 70000 })
            .unwrap();

        let paths: Vec<&str> = violations.all().iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec!["server", "port"]);
        assert!(engine.is_empty());
    }
}
