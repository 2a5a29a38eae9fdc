//! Diesel schema for wallets and the transaction ledger.

diesel::table! {
    /// One wallet per user.
    wallets (id) {
        /// Wallet identifier.
        id -> Uuid,
        /// Owning user, unique.
        user_id -> Uuid,
        /// Balance in minor units, never negative.
        balance_minor -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Timestamp of the latest posting.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only ledger entries.
    wallet_transactions (id) {
        /// Transaction identifier.
        id -> Uuid,
        /// Wallet the entry was posted to.
        wallet_id -> Uuid,
        /// Positive amount in minor units.
        amount_minor -> Int8,
        /// Entry kind.
        #[max_length = 20]
        kind -> Varchar,
        /// Entry status.
        #[max_length = 20]
        status -> Varchar,
        /// Free-text description.
        description -> Text,
        /// Job settled by this entry, if any.
        related_job_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(wallet_transactions -> wallets (wallet_id));
diesel::allow_tables_to_appear_in_same_query!(wallets, wallet_transactions);
