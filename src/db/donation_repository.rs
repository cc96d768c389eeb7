// src/db/donation_repository.rs
// DOCUMENTATION: Donation database operations

use crate::errors::ApiError;
use crate::models::{Donation, DonationQuery, PageQuery, PaymentMethod, PaymentStatus};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const SELECT_DONATION: &str = r#"
    SELECT d.*, c.title AS campaign_title
    FROM donations d
    LEFT JOIN campaigns c ON c.id = d.campaign_id
"#;

/// Values for a new donation row
#[derive(Debug)]
pub struct NewDonation<'a> {
    pub campaign_id: Uuid,
    pub user_id: Option<Uuid>,
    pub donor_name: &'a str,
    pub donor_email: Option<&'a str>,
    pub amount: i64,
    pub message: Option<&'a str>,
    pub is_anonymous: bool,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub external_id: &'a str,
}

pub struct DonationRepository;

impl DonationRepository {
    /// Insert a donation; `paid_at` is stamped when it is created already paid
    pub async fn insert(
        conn: &mut PgConnection,
        new: &NewDonation<'_>,
    ) -> Result<Donation, ApiError> {
        sqlx::query_as::<_, Donation>(
            r#"
            INSERT INTO donations (
                id, campaign_id, user_id, donor_name, donor_email, amount,
                message, is_anonymous, payment_method, status, external_id, paid_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                CASE WHEN $10 IN ('paid', 'settled') THEN NOW() ELSE NULL END
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.campaign_id)
        .bind(new.user_id)
        .bind(new.donor_name)
        .bind(new.donor_email)
        .bind(new.amount)
        .bind(new.message)
        .bind(new.is_anonymous)
        .bind(new.payment_method.as_str())
        .bind(new.status.as_str())
        .bind(new.external_id)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            log::error!("Failed to create donation: {}", e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    /// Store the gateway invoice reference
    pub async fn attach_invoice(
        pool: &PgPool,
        id: Uuid,
        invoice_id: &str,
        invoice_url: &str,
    ) -> Result<Donation, ApiError> {
        sqlx::query_as::<_, Donation>(
            r#"
            UPDATE donations
            SET invoice_id = $1, invoice_url = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(invoice_id)
        .bind(invoice_url)
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to attach invoice to donation {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Donation, ApiError> {
        let sql = format!("{} WHERE d.id = $1", SELECT_DONATION);
        sqlx::query_as::<_, Donation>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Donation".into()))
    }

    pub async fn get_by_external_id(pool: &PgPool, external_id: &str) -> Result<Donation, ApiError> {
        let sql = format!("{} WHERE d.external_id = $1", SELECT_DONATION);
        sqlx::query_as::<_, Donation>(&sql)
            .bind(external_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Donation".into()))
    }

    /// Lock a donation by external id for the webhook transaction
    pub async fn find_for_update(
        conn: &mut PgConnection,
        external_id: &str,
    ) -> Result<Option<Donation>, ApiError> {
        let donation = sqlx::query_as::<_, Donation>(
            "SELECT * FROM donations WHERE external_id = $1 FOR UPDATE",
        )
        .bind(external_id)
        .fetch_optional(conn)
        .await?;
        Ok(donation)
    }

    pub async fn get_for_update(conn: &mut PgConnection, id: Uuid) -> Result<Donation, ApiError> {
        sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| ApiError::NotFound("Donation".into()))
    }

    pub async fn set_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: PaymentStatus,
        payment_method: Option<&str>,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE donations
            SET status = $1,
                paid_at = CASE WHEN $1 IN ('paid', 'settled') THEN COALESCE(paid_at, NOW()) ELSE paid_at END,
                payment_method = COALESCE($2, payment_method),
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(status.as_str())
        .bind(payment_method)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Paid donations of one campaign, newest first
    pub async fn list_successful_by_campaign(
        pool: &PgPool,
        campaign_id: Uuid,
        paging: PageQuery,
    ) -> Result<(Vec<Donation>, i64), ApiError> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM donations WHERE campaign_id = $1 AND status IN ('paid', 'settled')",
        )
        .bind(campaign_id)
        .fetch_one(pool)
        .await?;

        let sql = format!(
            "{} WHERE d.campaign_id = $1 AND d.status IN ('paid', 'settled') \
             ORDER BY COALESCE(d.paid_at, d.created_at) DESC LIMIT $2 OFFSET $3",
            SELECT_DONATION
        );
        let donations = sqlx::query_as::<_, Donation>(&sql)
            .bind(campaign_id)
            .bind(paging.limit())
            .bind(paging.offset())
            .fetch_all(pool)
            .await?;

        Ok((donations, total))
    }

    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        paging: PageQuery,
    ) -> Result<(Vec<Donation>, i64), ApiError> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM donations WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        let sql = format!(
            "{} WHERE d.user_id = $1 ORDER BY d.created_at DESC LIMIT $2 OFFSET $3",
            SELECT_DONATION
        );
        let donations = sqlx::query_as::<_, Donation>(&sql)
            .bind(user_id)
            .bind(paging.limit())
            .bind(paging.offset())
            .fetch_all(pool)
            .await?;

        Ok((donations, total))
    }

    /// Back-office listing with optional status and campaign filters
    pub async fn list(
        pool: &PgPool,
        query: &DonationQuery,
    ) -> Result<(Vec<Donation>, i64), ApiError> {
        let paging = PageQuery::new(query.page, query.limit);

        fn filters(qb: &mut QueryBuilder<'_, Postgres>, query: &DonationQuery) {
            qb.push(" WHERE 1 = 1");
            if let Some(status) = query.status {
                qb.push(" AND d.status = ").push_bind(status.as_str());
            }
            if let Some(campaign_id) = query.campaign_id {
                qb.push(" AND d.campaign_id = ").push_bind(campaign_id);
            }
        }

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM donations d");
        filters(&mut count, query);
        let (total,): (i64,) = count.build_query_as().fetch_one(pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_DONATION);
        filters(&mut select, query);
        select
            .push(" ORDER BY d.created_at DESC LIMIT ")
            .push_bind(paging.limit())
            .push(" OFFSET ")
            .push_bind(paging.offset());

        let donations = select.build_query_as::<Donation>().fetch_all(pool).await?;
        Ok((donations, total))
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM donations WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
