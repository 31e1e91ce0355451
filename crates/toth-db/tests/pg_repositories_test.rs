//! PostgreSQL repository tests.
//!
//! Require a migrated database at `DATABASE_URL`; run with
//! `cargo test -p toth-db -- --ignored`.

use toth_db::test_fixtures::TestDatabase;
use toth_db::{
    CcpRepository, DocumentKind, DocumentRepository, Error, EvaluationRepository, NewCcp,
    NewDocument, NewEvaluation, PageRequest,
};

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_document_crud_roundtrip() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let docs = &test_db.db.documents;

    let created = docs
        .insert(NewDocument {
            title: "Intro".to_string(),
            kind: DocumentKind::Course,
        })
        .await
        .unwrap();
    assert_eq!(created.filename, None);

    let mut fetched = docs.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);

    fetched.filename = Some("intro.pdf".to_string());
    fetched.kind = DocumentKind::Exercise;
    let saved = docs.save(&fetched).await.unwrap();
    assert_eq!(saved.filename.as_deref(), Some("intro.pdf"));
    assert_eq!(saved.kind, DocumentKind::Exercise);

    docs.delete(created.id).await.unwrap();
    assert!(docs.get(created.id).await.unwrap().is_none());
    assert!(matches!(
        docs.delete(created.id).await.unwrap_err(),
        Error::DocumentNotFound(_)
    ));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_document_list_pages_in_id_order() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let docs = &test_db.db.documents;

    for i in 0..5 {
        docs.insert(NewDocument {
            title: format!("Doc {}", i),
            kind: DocumentKind::Course,
        })
        .await
        .unwrap();
    }

    let page = docs.list(PageRequest::new(1, 2)).await.unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].title, "Doc 2");
    assert!(page.has_next());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_ccp_document_membership() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let db = &test_db.db;

    let a = db
        .documents
        .insert(NewDocument {
            title: "A".to_string(),
            kind: DocumentKind::Course,
        })
        .await
        .unwrap();
    let b = db
        .documents
        .insert(NewDocument {
            title: "B".to_string(),
            kind: DocumentKind::Exercise,
        })
        .await
        .unwrap();

    let mut ccp = db
        .ccps
        .insert(NewCcp {
            title: "Module 1".to_string(),
            documents: vec![a.id, b.id],
        })
        .await
        .unwrap();
    assert_eq!(
        db.ccps.get(ccp.id).await.unwrap().unwrap().documents,
        vec![a.id, b.id]
    );

    ccp.documents = vec![b.id];
    db.ccps.save(&ccp).await.unwrap();
    assert_eq!(
        db.ccps.get(ccp.id).await.unwrap().unwrap().documents,
        vec![b.id]
    );

    // Deleting a document drops its membership rows
    db.documents.delete(b.id).await.unwrap();
    assert!(db
        .ccps
        .get(ccp.id)
        .await
        .unwrap()
        .unwrap()
        .documents
        .is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_evaluation_ccp_link_cleared_on_ccp_delete() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let db = &test_db.db;

    let ccp = db
        .ccps
        .insert(NewCcp {
            title: "Module".to_string(),
            documents: vec![],
        })
        .await
        .unwrap();
    let eval = db
        .evaluations
        .insert(NewEvaluation {
            title: "Final exam".to_string(),
            ccp_id: Some(ccp.id),
        })
        .await
        .unwrap();

    db.ccps.delete(ccp.id).await.unwrap();
    let reloaded = db.evaluations.get(eval.id).await.unwrap().unwrap();
    assert_eq!(reloaded.ccp_id, None);

    test_db.cleanup().await;
}
