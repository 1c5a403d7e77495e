//! Client against a live server on an ephemeral port

use std::path::Path;
use std::sync::Arc;

use portfolio_admin::models::{NewProject, NewSibling, OrderedEntity, SiblingKind, SiblingPatch};
use portfolio_admin::{reorder_cached, ApiClient, ClientConfig, ClientError, OptimisticList, SiblingCommands};
use portfolio_server::repository::init_db;
use portfolio_server::{router, AppState};
use sibling_order::{ReorderPlan, Reorderer};

async fn spawn_server() -> ApiClient {
    let db = init_db(Path::new(":memory:")).await.expect("Failed to init DB");
    let app = router(Arc::new(AppState::new(db)), None);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    ApiClient::new(ClientConfig::new(format!("http://{}", addr))).unwrap()
}

async fn seed_zones(client: &ApiClient, titles: &[&str]) -> u32 {
    let project = client
        .create_project(&NewProject {
            title: "Castle".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    for title in titles {
        client
            .create_sibling(
                SiblingKind::Zone,
                project.id,
                &NewSibling {
                    title: title.to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
    project.id
}

fn layout(zones: &[OrderedEntity]) -> Vec<(String, i32)> {
    zones.iter().map(|z| (z.title.clone(), z.order)).collect()
}

#[tokio::test]
async fn test_two_phase_reorder_over_http() {
    let client = spawn_server().await;
    assert!(client.health().await.unwrap());
    let project = seed_zones(&client, &["A", "B", "C"]).await;

    let store = Arc::new(SiblingCommands::new(client.clone(), SiblingKind::Zone));
    let reorderer = Reorderer::new(store);
    let mut cache = OptimisticList::new(project, client.list_children(SiblingKind::Zone, project).await.unwrap());

    let outcome = reorder_cached(&reorderer, &mut cache, 0, 2).await.expect("Reorder failed");
    assert_eq!(outcome.writes, 6);

    let zones = client.list_children(SiblingKind::Zone, project).await.unwrap();
    assert_eq!(
        layout(&zones),
        vec![("B".to_string(), 1), ("C".to_string(), 2), ("A".to_string(), 3)]
    );
    assert_eq!(layout(cache.items()), layout(&zones));
}

#[tokio::test]
async fn test_transactional_reorder_over_http() {
    let client = spawn_server().await;
    let project = seed_zones(&client, &["A", "B"]).await;
    let zones = client.list_children(SiblingKind::Zone, project).await.unwrap();

    let request = ReorderPlan::for_move(&zones, 0, 1).unwrap().to_request(project);
    let reordered = client.reorder_children(SiblingKind::Zone, &request).await.unwrap();
    assert_eq!(layout(&reordered), vec![("B".to_string(), 1), ("A".to_string(), 2)]);
}

#[tokio::test]
async fn test_error_statuses_map_to_client_errors() {
    let client = spawn_server().await;
    let project = seed_zones(&client, &["A", "B"]).await;
    let zones = client.list_children(SiblingKind::Zone, project).await.unwrap();

    let collide = SiblingPatch {
        order: Some(1),
        ..Default::default()
    };
    let err = client
        .update_sibling(SiblingKind::Zone, zones[1].id, &collide)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Conflict(_)));

    let err = client.get_project(999).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));

    let err = client
        .create_sibling(
            SiblingKind::Quest,
            zones[0].id,
            &NewSibling {
                title: "  ".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Invalid(_)));
}

#[tokio::test]
async fn test_project_delete_cascades() {
    let client = spawn_server().await;
    let project = seed_zones(&client, &["A"]).await;
    let zone = client.list_children(SiblingKind::Zone, project).await.unwrap().remove(0);

    client.delete_project(project).await.unwrap();
    assert!(matches!(
        client.get_sibling(SiblingKind::Zone, zone.id).await,
        Err(ClientError::NotFound(_))
    ));
    assert!(client.list_projects().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_parked_zone_is_reordered_back_over_http() {
    let client = spawn_server().await;
    let project = seed_zones(&client, &["A", "B", "C"]).await;
    let zones = client.list_children(SiblingKind::Zone, project).await.unwrap();

    // Where a write-back that lost its connection would leave a zone
    let park = SiblingPatch {
        order: Some(10_001),
        ..Default::default()
    };
    client.update_sibling(SiblingKind::Zone, zones[0].id, &park).await.unwrap();

    let store = Arc::new(SiblingCommands::new(client.clone(), SiblingKind::Zone));
    let reorderer = Reorderer::new(store);
    let mut cache = OptimisticList::new(project, client.list_children(SiblingKind::Zone, project).await.unwrap());
    assert_eq!(
        layout(cache.items()),
        vec![("B".to_string(), 2), ("C".to_string(), 3), ("A".to_string(), 10_001)]
    );

    reorder_cached(&reorderer, &mut cache, 2, 0).await.expect("Reorder failed");

    let zones = client.list_children(SiblingKind::Zone, project).await.unwrap();
    assert_eq!(
        layout(&zones),
        vec![("A".to_string(), 1), ("B".to_string(), 2), ("C".to_string(), 3)]
    );
    assert_eq!(layout(cache.items()), layout(&zones));
}

#[tokio::test]
async fn test_project_lookup_by_slug() {
    let client = spawn_server().await;
    let created = client
        .create_project(&NewProject {
            title: "Castle".to_string(),
            slug: Some("castle".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let found = client.get_project_by_slug("castle").await.unwrap();
    assert_eq!(found.id, created.id);
    assert!(matches!(
        client.get_project_by_slug("tower").await,
        Err(ClientError::NotFound(_))
    ));
}
