use crate::helpers::harness::with_test_db;
use anyhow::Result;
use pgrebuild::PlanError;
use pgrebuild::catalog::Catalog;
use pgrebuild::catalog::dependency::fetch;
use pgrebuild::catalog::id::{QualifiedName, RelationKind};
use pgrebuild::plan::build_plan;

fn target(s: &str) -> QualifiedName {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_fetch_direct_view_dependencies() -> Result<()> {
    with_test_db(async |db| -> Result<()> {
        db.execute(
            r#"
            CREATE TABLE public.t (id int);
            CREATE VIEW public.v1 AS SELECT id FROM public.t;
            CREATE VIEW public.v2 AS SELECT id FROM public.v1;
            CREATE MATERIALIZED VIEW public.m1 AS SELECT id FROM public.v2;
            "#,
        )
        .await;

        let mut conn = db.conn().await;
        let rows = fetch(&mut conn).await?;
        let pairs: Vec<(String, String)> = rows
            .iter()
            .map(|r| (r.source_name.clone(), r.dependent_name.clone()))
            .collect();

        // Tables never appear; only view-to-view edges, each once
        assert_eq!(
            pairs,
            vec![
                ("v1".to_string(), "v2".to_string()),
                ("v2".to_string(), "m1".to_string()),
            ]
        );
        assert_eq!(rows[1].dependent_kind, "m");
        Ok(())
    })
    .await
    .transpose()?;
    Ok(())
}

#[tokio::test]
async fn test_load_resolves_target_and_plans() -> Result<()> {
    with_test_db(async |db| -> Result<()> {
        db.execute(
            r#"
            CREATE SCHEMA app;
            CREATE VIEW app.a AS SELECT 1 AS x;
            CREATE VIEW app.b AS SELECT x FROM app.a;
            CREATE VIEW app.c AS SELECT x FROM app.b;
            CREATE VIEW app.d AS SELECT x FROM app.a UNION ALL SELECT x FROM app.c;
            "#,
        )
        .await;

        let mut conn = db.conn().await;
        let catalog = Catalog::load(&mut conn, &target("app.a")).await?;
        let object = catalog.resolve_target(&target("app.a"))?;
        assert_eq!(object.kind, RelationKind::View);

        let plan = build_plan(&catalog, &object)?;
        let creates: Vec<&str> = plan.creates.iter().map(|a| a.object.name.as_str()).collect();
        assert_eq!(creates, vec!["b", "c", "d"]);
        Ok(())
    })
    .await
    .transpose()?;
    Ok(())
}

#[tokio::test]
async fn test_load_rejects_non_view_target() -> Result<()> {
    with_test_db(async |db| -> Result<()> {
        db.execute("CREATE SEQUENCE public.counter").await;

        let mut conn = db.conn().await;
        let err = Catalog::load(&mut conn, &target("public.counter"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlanError>(),
            Some(PlanError::UnknownRelationKind { .. })
        ));
        Ok(())
    })
    .await
    .transpose()?;
    Ok(())
}

#[tokio::test]
async fn test_quoted_identifiers_round_trip() -> Result<()> {
    with_test_db(async |db| -> Result<()> {
        db.execute(
            r#"
            CREATE SCHEMA "Sales";
            CREATE VIEW "Sales"."By Region" AS SELECT 1 AS x;
            CREATE VIEW "Sales"."Top" AS SELECT x FROM "Sales"."By Region";
            "#,
        )
        .await;

        let mut conn = db.conn().await;
        let name = target("Sales.By Region");
        let catalog = Catalog::load(&mut conn, &name).await?;
        let object = catalog.resolve_target(&name)?;

        let plan = build_plan(&catalog, &object)?;
        assert_eq!(plan.creates.len(), 1);
        assert_eq!(plan.creates[0].object.name, "Top");
        Ok(())
    })
    .await
    .transpose()?;
    Ok(())
}
