// Tests for catalog lookups and availability tracking
