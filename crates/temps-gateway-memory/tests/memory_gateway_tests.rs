use serde_json::{json, Value};
use std::sync::Arc;
use temps_gateway::conformance::{lint_dataset, lint_gateway};
use temps_gateway::{
    same_gateway, AdapterId, AdapterNamespace, AdapterRegistry, Arity, Command, CommandKind,
    Dataset, Gateway, GatewayConfig, GatewayError, GatewayFn, GatewaySet, GatewaysConfig,
    Migrator, Result, StaticLoader, Tuple,
};
use temps_gateway_memory::{MemoryGateway, MemoryMigrator, ADAPTER, LOAD_PATH};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("temps_gateway=debug,temps_gateway_memory=debug")
        .with_test_writer()
        .try_init();
}

fn expect_err<T>(result: Result<T>) -> GatewayError {
    match result {
        Ok(_) => panic!("expected an error"),
        Err(e) => e,
    }
}

fn tuple(value: Value) -> Tuple {
    value.as_object().cloned().unwrap()
}

fn memory() -> AdapterId {
    AdapterId::new(ADAPTER)
}

fn loading_registry() -> AdapterRegistry {
    let loader = StaticLoader::new().with_unit(LOAD_PATH, temps_gateway_memory::adapter);
    AdapterRegistry::with_loader(Arc::new(loader))
}

async fn registered() -> AdapterRegistry {
    let registry = AdapterRegistry::new();
    temps_gateway_memory::register(&registry).await.unwrap();
    registry
}

#[tokio::test]
async fn test_memory_gateway_conforms() {
    init_tracing();
    let registry = registered().await;

    let failures = lint_gateway(&registry, &memory(), Vec::new()).await;
    assert!(failures.is_empty(), "lint failures: {:?}", failures);
}

#[tokio::test]
async fn test_memory_dataset_conforms() {
    let registry = registered().await;
    let rows = vec![
        tuple(json!({"name": "Jane", "age": 24})),
        tuple(json!({"name": "Joe", "age": 25})),
    ];

    let gateway = registry
        .setup(memory(), vec![json!({"users": rows.clone()})])
        .await
        .unwrap();
    let users = gateway.dataset("users").unwrap();

    let failures = lint_dataset(users.as_ref(), &rows);
    assert!(failures.is_empty(), "lint failures: {:?}", failures);
}

#[tokio::test]
async fn test_setup_loads_adapter_on_demand() {
    init_tracing();
    let registry = loading_registry();
    assert!(!registry.has_adapter(&memory()).await);

    let gateway = registry.setup(memory(), Vec::new()).await.unwrap();

    assert_eq!(gateway.adapter().unwrap(), ADAPTER);
    assert_eq!(gateway.type_name(), "MemoryGateway");
    assert!(registry.has_adapter(&memory()).await);
    assert_eq!(registry.list_adapters().await, vec![memory()]);
}

#[tokio::test]
async fn test_setup_with_instance_skips_resolution() {
    let registry = AdapterRegistry::new();
    let gateway: Arc<dyn Gateway> = Arc::new(MemoryGateway::new());

    let same = registry.setup(gateway.clone(), Vec::new()).await.unwrap();
    assert!(same_gateway(&same, &gateway));

    let err = expect_err(registry.setup(gateway, vec![json!({})]).await);
    assert!(matches!(err, GatewayError::Argument(_)));
}

#[tokio::test]
async fn test_seed_and_schema() {
    let registry = registered().await;
    let gateway = registry
        .setup(
            memory(),
            vec![json!({
                "users": [{"name": "Jane"}, {"name": "Joe"}],
                "tasks": [{"title": "Write docs"}]
            })],
        )
        .await
        .unwrap();

    let schema = gateway.schema().await.unwrap();
    let names: Vec<_> = schema.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["tasks", "users"]);
    assert_eq!(schema[1].1.count(), 2);
}

#[tokio::test]
async fn test_too_many_seed_arguments() {
    let registry = registered().await;
    let err = expect_err(registry.setup(memory(), vec![json!({}), json!({})]).await);
    assert!(matches!(err, GatewayError::Argument(_)));
}

#[tokio::test]
async fn test_migrator_is_bound_to_gateway() {
    init_tracing();
    let registry = registered().await;
    let gateway = registry.setup(memory(), Vec::new()).await.unwrap();

    let migrator = registry
        .migrator(
            &gateway,
            vec![
                json!({"version": "001", "create": ["users"]}),
                json!({"version": "002", "create": ["tasks"]}),
            ],
        )
        .await
        .unwrap();

    assert!(migrator.is::<MemoryMigrator>());
    assert!(same_gateway(&migrator.gateway().unwrap(), &gateway));

    assert_eq!(migrator.pending().await.unwrap(), vec!["001", "002"]);
    assert_eq!(migrator.run().await.unwrap(), vec!["001", "002"]);
    assert!(migrator.pending().await.unwrap().is_empty());

    let memory_gateway = gateway.downcast_ref::<MemoryGateway>().unwrap();
    assert!(memory_gateway.has_dataset("users"));
    assert!(memory_gateway.has_dataset("tasks"));
    assert_eq!(memory_gateway.applied_migrations().len(), 2);
}

#[tokio::test]
async fn test_invalid_migration_argument() {
    let registry = registered().await;
    let gateway = registry.setup(memory(), Vec::new()).await.unwrap();

    let err = expect_err(registry.migrator(&gateway, vec![json!("001")]).await);
    assert!(matches!(err, GatewayError::Argument(_)));
}

#[tokio::test]
async fn test_commands_through_gateway() {
    let gateway = MemoryGateway::new();

    let create = gateway
        .command(CommandKind::Create, "users", Tuple::new())
        .unwrap();
    assert_eq!(create.kind(), CommandKind::Create);
    assert_eq!(create.dataset_name(), "users");
    create
        .call(vec![
            tuple(json!({"id": 1, "name": "Jane"})),
            tuple(json!({"id": 2, "name": "Joe"})),
        ])
        .unwrap();

    let update = gateway
        .command(CommandKind::Update, "users", tuple(json!({"id": 1})))
        .unwrap();
    update.call(vec![tuple(json!({"name": "Janet"}))]).unwrap();

    let delete = gateway
        .command(CommandKind::Delete, "users", tuple(json!({"id": 2})))
        .unwrap();
    assert_eq!(delete.call(Vec::new()).unwrap().len(), 1);

    let users = gateway.dataset("users").unwrap();
    assert_eq!(users.to_vec(), vec![tuple(json!({"id": 1, "name": "Janet"}))]);
}

#[tokio::test]
async fn test_gateway_set_from_yaml() {
    init_tracing();
    let registry = loading_registry();
    let config = GatewaysConfig::from_yaml_str(
        r#"
gateways:
  default:
    adapter: memory
    args:
      - users:
          - { name: Jane, age: 24 }
  archive:
    adapter: memory
"#,
    )
    .unwrap();

    let set = GatewaySet::setup(&registry, &config).await.unwrap();
    assert_eq!(set.names(), vec!["archive", "default"]);

    let default = set.default_gateway().unwrap();
    assert_eq!(default.dataset("users").unwrap().count(), 1);
    assert!(!same_gateway(&default, &set.get("archive").unwrap()));

    set.disconnect_all().await.unwrap();
    let err = expect_err(default.dataset("users"));
    assert!(matches!(err, GatewayError::Disconnected(_)));
}

#[tokio::test]
async fn test_gateway_set_rejects_uri_entries() {
    let registry = registered().await;
    let config = GatewaysConfig::from_json_value(json!({
        "gateways": {
            "archive": {"adapter": "memory"},
            "default": {"uri": "memory://localhost"}
        }
    }))
    .unwrap();

    let err = expect_err(GatewaySet::setup(&registry, &config).await);
    assert!(matches!(err, GatewayError::Configuration(_)));
}

#[tokio::test]
async fn test_failed_gateway_set_disconnects_built_gateways() {
    let archive = Arc::new(MemoryGateway::new());
    let shared = archive.clone();

    let registry = AdapterRegistry::new();
    registry
        .register(
            ADAPTER,
            AdapterNamespace::new().with_gateway(GatewayFn::new(
                "MemoryGateway",
                Arity::Zero,
                move |_| Ok(shared.clone() as Arc<dyn Gateway>),
            )),
        )
        .await
        .unwrap();

    let config = GatewaysConfig::new()
        .with_gateway("archive", GatewayConfig::new(ADAPTER))
        .with_gateway(
            "default",
            GatewayConfig {
                uri: Some("memory://localhost".to_string()),
                ..Default::default()
            },
        );

    let err = expect_err(GatewaySet::setup(&registry, &config).await);
    assert!(matches!(err, GatewayError::Configuration(_)));
    assert!(!archive.is_connected());
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let registry = registered().await;
    let gateway = registry.setup(memory(), Vec::new()).await.unwrap();

    gateway.disconnect().await.unwrap();
    gateway.disconnect().await.unwrap();

    let err = expect_err(gateway.schema().await);
    assert!(matches!(err, GatewayError::Disconnected(_)));
}
