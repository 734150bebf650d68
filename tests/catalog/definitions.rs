use crate::helpers::harness::with_test_db;
use anyhow::Result;
use pgrebuild::PlanError;
use pgrebuild::catalog::Catalog;
use pgrebuild::catalog::definition::{PgDefinitionProvider, fetch};
use pgrebuild::catalog::grant::GranteeType;
use pgrebuild::catalog::id::{CatalogObject, QualifiedName, RelationKind};
use pgrebuild::plan::{DefinitionProvider, build_plan, collect_definitions};

#[tokio::test]
async fn test_fetch_view_definition() -> Result<()> {
    with_test_db(async |db| -> Result<()> {
        db.execute(
            r#"
            CREATE VIEW public.report AS SELECT 1 AS x, 'a'::text AS label;
            GRANT SELECT ON public.report TO pgrebuild_reader;
            COMMENT ON VIEW public.report IS 'Daily report';
            "#,
        )
        .await;

        let mut conn = db.conn().await;
        let name: QualifiedName = "public.report".parse()?;
        let catalog = Catalog::load(&mut conn, &name).await?;
        let object = catalog.resolve_target(&name)?;

        let definition = fetch(&mut conn, &object).await?.expect("definition");
        assert!(definition.query.contains("SELECT 1 AS x"));
        assert!(definition.indexes.is_empty());
        assert_eq!(definition.comment.as_deref(), Some("Daily report"));
        assert_eq!(definition.grants.len(), 1);
        assert_eq!(
            definition.grants[0].grantee,
            GranteeType::Role("pgrebuild_reader".to_string())
        );
        assert_eq!(definition.grants[0].privileges, vec!["SELECT"]);
        Ok(())
    })
    .await
    .transpose()?;
    Ok(())
}

#[tokio::test]
async fn test_materialized_view_definition_includes_indexes() -> Result<()> {
    with_test_db(async |db| -> Result<()> {
        db.execute(
            r#"
            CREATE MATERIALIZED VIEW public.totals AS SELECT 1 AS id;
            CREATE UNIQUE INDEX totals_id ON public.totals (id);
            "#,
        )
        .await;

        let mut conn = db.conn().await;
        let name: QualifiedName = "public.totals".parse()?;
        let catalog = Catalog::load(&mut conn, &name).await?;
        let object = catalog.resolve_target(&name)?;
        assert_eq!(object.kind, RelationKind::MaterializedView);

        let mut provider = PgDefinitionProvider::new(&mut conn, true);
        let definition = provider.definition(&object).await?.expect("definition");
        let body = definition.body;
        assert!(body.contains("CREATE UNIQUE INDEX totals_id ON public.totals USING btree (id);"));
        assert!(body.contains("ALTER MATERIALIZED VIEW \"public\".\"totals\" OWNER TO"));
        Ok(())
    })
    .await
    .transpose()?;
    Ok(())
}

#[tokio::test]
async fn test_fetch_view_options_and_attached_objects() -> Result<()> {
    with_test_db(async |db| -> Result<()> {
        db.execute(
            r#"
            CREATE TABLE public.orders (id int PRIMARY KEY, total numeric NOT NULL);
            CREATE VIEW public.guarded WITH (security_barrier = true) AS
              SELECT id, total FROM public.orders;
            CREATE VIEW public.checked AS
              SELECT id, total FROM public.orders WHERE total > 0
              WITH LOCAL CHECK OPTION;
            GRANT SELECT (id, total) ON public.checked TO pgrebuild_reader;
            COMMENT ON COLUMN public.checked.total IS 'Order total';
            ALTER VIEW public.checked ALTER COLUMN total SET DEFAULT 0;
            CREATE FUNCTION public.guarded_insert() RETURNS trigger LANGUAGE plpgsql AS $$
            BEGIN
              INSERT INTO public.orders VALUES (NEW.id, NEW.total);
              RETURN NEW;
            END
            $$;
            CREATE TRIGGER guarded_insert INSTEAD OF INSERT ON public.guarded
              FOR EACH ROW EXECUTE FUNCTION public.guarded_insert();
            CREATE RULE guarded_delete AS ON DELETE TO public.guarded DO INSTEAD NOTHING;
            "#,
        )
        .await;

        let mut conn = db.conn().await;

        let name: QualifiedName = "public.guarded".parse()?;
        let guarded = Catalog::load(&mut conn, &name).await?.resolve_target(&name)?;
        let definition = fetch(&mut conn, &guarded).await?.expect("definition");
        assert_eq!(definition.create_options(), vec!["security_barrier=true"]);
        assert_eq!(definition.check_option(), None);
        assert_eq!(definition.triggers.len(), 1);
        assert!(definition.triggers[0].contains("INSTEAD OF INSERT"));
        assert_eq!(definition.rules.len(), 1);
        assert!(definition.rules[0].starts_with("CREATE RULE guarded_delete AS"));

        let name: QualifiedName = "public.checked".parse()?;
        let checked = Catalog::load(&mut conn, &name).await?.resolve_target(&name)?;
        let definition = fetch(&mut conn, &checked).await?.expect("definition");
        assert!(definition.create_options().is_empty());
        assert_eq!(definition.check_option().as_deref(), Some("LOCAL"));

        let column_grant = definition
            .grants
            .iter()
            .find(|g| !g.columns.is_empty())
            .expect("column grant");
        assert_eq!(
            column_grant.grantee,
            GranteeType::Role("pgrebuild_reader".to_string())
        );
        assert_eq!(column_grant.columns, vec!["id", "total"]);

        assert_eq!(definition.columns.len(), 1);
        assert_eq!(definition.columns[0].name, "total");
        assert_eq!(definition.columns[0].comment.as_deref(), Some("Order total"));
        assert_eq!(definition.columns[0].default_expr.as_deref(), Some("0"));
        Ok(())
    })
    .await
    .transpose()?;
    Ok(())
}

#[tokio::test]
async fn test_stale_object_has_no_definition() -> Result<()> {
    with_test_db(async |db| -> Result<()> {
        db.execute("CREATE VIEW public.gone AS SELECT 1 AS x").await;

        let mut conn = db.conn().await;
        let name: QualifiedName = "public.gone".parse()?;
        let catalog = Catalog::load(&mut conn, &name).await?;
        let object = catalog.resolve_target(&name)?;

        db.execute("DROP VIEW public.gone").await;

        // Same identity no longer exists: the whole run must fail
        let plan = build_plan(&catalog, &object)?;
        let mut provider = PgDefinitionProvider::new(&mut conn, true);
        let err = collect_definitions(&plan, &mut provider).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<PlanError>(),
            Some(&PlanError::MissingDefinition { object })
        );
        Ok(())
    })
    .await
    .transpose()?;
    Ok(())
}

#[tokio::test]
async fn test_definition_requires_matching_kind() -> Result<()> {
    with_test_db(async |db| -> Result<()> {
        db.execute("CREATE VIEW public.v AS SELECT 1 AS x").await;

        let mut conn = db.conn().await;
        let name: QualifiedName = "public.v".parse()?;
        let catalog = Catalog::load(&mut conn, &name).await?;
        let view = catalog.resolve_target(&name)?;

        let as_matview = CatalogObject::new(
            view.schema.clone(),
            view.name.clone(),
            RelationKind::MaterializedView,
            view.oid,
        );
        assert!(fetch(&mut conn, &as_matview).await?.is_none());
        Ok(())
    })
    .await
    .transpose()?;
    Ok(())
}
